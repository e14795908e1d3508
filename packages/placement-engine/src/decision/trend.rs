use super::ScoreTrend;

/// Direction of a short score window, judged by last minus first
pub fn score_trend(recent: &[u32], delta: i64) -> ScoreTrend {
    let (first, last) = match recent {
        [first, .., last] => (*first, *last),
        _ => return ScoreTrend::Stable,
    };

    let change = i64::from(last) - i64::from(first);
    if change >= delta {
        ScoreTrend::Improving
    } else if change <= -delta {
        ScoreTrend::Declining
    } else {
        ScoreTrend::Stable
    }
}

/// Mean of the window; 0 when empty
pub fn average_score(recent: &[u32]) -> f64 {
    if recent.is_empty() {
        return 0.0;
    }
    recent.iter().map(|&s| f64::from(s)).sum::<f64>() / recent.len() as f64
}
