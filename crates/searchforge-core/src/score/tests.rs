use super::*;

#[test]
fn test_simple_score_ordering_and_arithmetic() {
    let a = SimpleScore::of(-5);
    let b = SimpleScore::of(-3);
    assert!(b > a);
    assert_eq!(a + b, SimpleScore::of(-8));
    assert_eq!(b - a, SimpleScore::of(2));
    assert_eq!(-a, SimpleScore::of(5));
    assert_eq!(SimpleScore::zero(), SimpleScore::of(0));
}

#[test]
fn test_hard_soft_lexicographic_ordering() {
    assert!(HardSoftScore::of(0, -1000) > HardSoftScore::of(-1, 0));
    assert!(HardSoftScore::of(-1, -2) < HardSoftScore::of(-1, -1));
    assert_eq!(
        HardSoftScore::of(-1, 5).cmp(&HardSoftScore::of(-1, 5)),
        std::cmp::Ordering::Equal
    );
}

#[test]
fn test_hard_medium_soft_ordering() {
    let a = HardMediumSoftScore::of(0, -1, 100);
    let b = HardMediumSoftScore::of(0, 0, -100);
    assert!(b > a);
    assert!(!HardMediumSoftScore::of(-1, 0, 0).is_feasible());
}

#[test]
fn test_level_numbers_round_trip() {
    let score = HardSoftScore::of(-2, 7);
    assert_eq!(score.to_level_numbers(), vec![-2, 7]);
    assert_eq!(HardSoftScore::from_level_numbers(&[-2, 7]), score);
    assert_eq!(HardSoftScore::from_level_numbers(&[-2]), HardSoftScore::of(-2, 0));
    assert_eq!(score.to_level_doubles(), vec![-2.0, 7.0]);
}

#[test]
fn test_scale_and_abs() {
    let score = HardSoftScore::of(-3, 10);
    assert_eq!(score.multiply(2.0), HardSoftScore::of(-6, 20));
    assert_eq!(score.divide(2.0), HardSoftScore::of(-2, 5));
    assert_eq!(score.abs(), HardSoftScore::of(3, 10));
}

#[test]
fn test_parse_and_display() {
    let score = HardSoftScore::parse("-1hard/-20soft").unwrap();
    assert_eq!(score, HardSoftScore::of(-1, -20));
    assert_eq!(score.to_string(), "-1hard/-20soft");

    let hms = HardMediumSoftScore::parse("0hard/-2medium/3soft").unwrap();
    assert_eq!(hms, HardMediumSoftScore::of(0, -2, 3));

    assert_eq!(SimpleScore::parse(" -7 ").unwrap(), SimpleScore::of(-7));
}

#[test]
fn test_parse_errors() {
    assert!(HardSoftScore::parse("-1hard").is_err());
    assert!(HardSoftScore::parse("-1hard/xsoft").is_err());
    assert!(HardSoftScore::parse("-1medium/2soft").is_err());
    assert!(SimpleScore::parse("abc").is_err());
}

#[test]
fn test_level_labels() {
    assert_eq!(HardSoftScore::level_label(0), ScoreLevel::Hard);
    assert_eq!(HardSoftScore::level_label(1), ScoreLevel::Soft);
    assert_eq!(HardMediumSoftScore::level_label(1), ScoreLevel::Medium);
}
