//! Built-in spreadsheet functions and their metadata.
//!
//! Conventions:
//! - Every built-in takes an ordered list of numbers and returns a number,
//!   a boolean or a list of numbers.
//! - Names are matched case-insensitively (`SUM`, `Sum` and `sum` are the same).
//! - Built-ins never fail: bad input produces `NaN` instead.
//! - If you add a built-in, add a variant to [`Builtin`], list it in
//!   [`BUILTINS`] and implement it in [`Builtin::apply`].

use rand::Rng;

use crate::engine::Value;

/// Longest sequence `range` will produce before giving up with `NaN`.
const MAX_RANGE_LEN: usize = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Sum,
    Average,
    Median,
    Even,
    SomeEven,
    EveryEven,
    FirstTwo,
    LastTwo,
    Has2,
    Increment,
    Random,
    Range,
    NoDupes,
    /// The unnamed call `(x)`: returns its argument unchanged.
    Identity,
}

pub struct BuiltinInfo {
    pub name: &'static str,
    pub builtin: Builtin,
    #[allow(dead_code)]
    pub description: &'static str,
}

pub const BUILTINS: &[BuiltinInfo] = &[
    BuiltinInfo {
        name: "sum",
        builtin: Builtin::Sum,
        description: "Sum of the arguments (0 when empty)",
    },
    BuiltinInfo {
        name: "average",
        builtin: Builtin::Average,
        description: "Arithmetic mean (undefined for empty input)",
    },
    BuiltinInfo {
        name: "median",
        builtin: Builtin::Median,
        description: "Middle value, or the mean of the two middle values",
    },
    BuiltinInfo {
        name: "even",
        builtin: Builtin::Even,
        description: "Only the arguments divisible by 2",
    },
    BuiltinInfo {
        name: "someeven",
        builtin: Builtin::SomeEven,
        description: "True if any argument is divisible by 2",
    },
    BuiltinInfo {
        name: "everyeven",
        builtin: Builtin::EveryEven,
        description: "True if every argument is divisible by 2",
    },
    BuiltinInfo {
        name: "firsttwo",
        builtin: Builtin::FirstTwo,
        description: "The first two arguments",
    },
    BuiltinInfo {
        name: "lasttwo",
        builtin: Builtin::LastTwo,
        description: "The last two arguments",
    },
    BuiltinInfo {
        name: "has2",
        builtin: Builtin::Has2,
        description: "True if any argument equals 2",
    },
    BuiltinInfo {
        name: "increment",
        builtin: Builtin::Increment,
        description: "Every argument plus one",
    },
    BuiltinInfo {
        name: "random",
        builtin: Builtin::Random,
        description: "random(x, y): a random integer in [x, x + y)",
    },
    BuiltinInfo {
        name: "range",
        builtin: Builtin::Range,
        description: "range(start, end): start, start + 1, ..., end",
    },
    BuiltinInfo {
        name: "nodupes",
        builtin: Builtin::NoDupes,
        description: "Arguments with duplicates removed",
    },
    BuiltinInfo {
        name: "",
        builtin: Builtin::Identity,
        description: "Parenthesised value, returned unchanged",
    },
];

fn is_even(n: f64) -> bool {
    n % 2.0 == 0.0
}

fn sum(nums: &[f64]) -> f64 {
    nums.iter().sum()
}

fn average(nums: &[f64]) -> f64 {
    sum(nums) / nums.len() as f64
}

fn median(nums: &[f64]) -> f64 {
    if nums.is_empty() {
        return f64::NAN;
    }
    let mut sorted = nums.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        average(&sorted[mid - 1..=mid])
    } else {
        sorted[mid]
    }
}

fn random(nums: &[f64]) -> f64 {
    let [x, y, ..] = nums else {
        return f64::NAN;
    };
    let r: f64 = rand::thread_rng().r#gen();
    (r * y + x).floor()
}

fn range(nums: &[f64]) -> Value {
    let [start, end, ..] = nums else {
        return Value::Number(f64::NAN);
    };
    if start.is_nan() || end.is_nan() || end < start {
        return Value::List(Vec::new());
    }
    let len = (end - start).floor() + 1.0;
    if len > MAX_RANGE_LEN as f64 {
        return Value::Number(f64::NAN);
    }
    Value::List((0..len as usize).map(|i| start + i as f64).collect())
}

fn no_dupes(nums: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(nums.len());
    for &n in nums {
        // Bitwise comparison so NaN is de-duplicated too.
        if !out.iter().any(|seen| seen.to_bits() == n.to_bits() || *seen == n) {
            out.push(n);
        }
    }
    out
}

impl Builtin {
    /// Look up a built-in by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Builtin> {
        BUILTINS
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .map(|b| b.builtin)
    }

    pub fn name(self) -> &'static str {
        BUILTINS
            .iter()
            .find(|b| b.builtin == self)
            .map(|b| b.name)
            .unwrap_or_default()
    }

    /// Apply the built-in to a list of numbers.
    pub fn apply(self, nums: &[f64]) -> Value {
        match self {
            Builtin::Sum => Value::Number(sum(nums)),
            Builtin::Average => Value::Number(average(nums)),
            Builtin::Median => Value::Number(median(nums)),
            Builtin::Even => Value::List(nums.iter().copied().filter(|n| is_even(*n)).collect()),
            Builtin::SomeEven => Value::Bool(nums.iter().any(|n| is_even(*n))),
            Builtin::EveryEven => Value::Bool(nums.iter().all(|n| is_even(*n))),
            Builtin::FirstTwo => Value::List(nums.iter().take(2).copied().collect()),
            Builtin::LastTwo => Value::List(nums[nums.len().saturating_sub(2)..].to_vec()),
            Builtin::Has2 => Value::Bool(nums.contains(&2.0)),
            Builtin::Increment => Value::List(nums.iter().map(|n| n + 1.0).collect()),
            Builtin::Random => Value::Number(random(nums)),
            Builtin::Range => range(nums),
            Builtin::NoDupes => Value::List(no_dupes(nums)),
            Builtin::Identity => match nums {
                [n] => Value::Number(*n),
                _ => Value::List(nums.to_vec()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(v: &[f64]) -> Value {
        Value::List(v.to_vec())
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(Builtin::from_name("SUM"), Some(Builtin::Sum));
        assert_eq!(Builtin::from_name("Median"), Some(Builtin::Median));
        assert_eq!(Builtin::from_name(""), Some(Builtin::Identity));
        assert_eq!(Builtin::from_name("foo"), None);
        assert_eq!(Builtin::NoDupes.name(), "nodupes");
    }

    #[test]
    fn test_sum_and_average() {
        assert_eq!(Builtin::Sum.apply(&[1.0, 2.0, 3.0]), Value::Number(6.0));
        assert_eq!(Builtin::Sum.apply(&[]), Value::Number(0.0));
        assert_eq!(Builtin::Average.apply(&[5.0, 10.0]), Value::Number(7.5));
        let Value::Number(n) = Builtin::Average.apply(&[]) else {
            panic!("average must return a number");
        };
        assert!(n.is_nan());
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(Builtin::Median.apply(&[3.0, 1.0, 2.0]), Value::Number(2.0));
        assert_eq!(Builtin::Median.apply(&[4.0, 1.0, 3.0, 2.0]), Value::Number(2.5));
        assert_eq!(Builtin::Median.apply(&[7.0]), Value::Number(7.0));
    }

    #[test]
    fn test_median_matches_middle_elements() {
        let inputs: &[&[f64]] = &[
            &[9.0, -1.0, 4.0, 4.0, 0.5, 12.0],
            &[1.0, 100.0, 50.0, 2.0, 3.0],
            &[-3.0, -3.0],
            &[2.0, 8.0, 6.0, 4.0, 10.0, 0.0, 1.0, 7.0],
        ];
        for input in inputs {
            let mut sorted = input.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let mid = sorted.len() / 2;
            let expected = if sorted.len() % 2 == 0 {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            } else {
                sorted[mid]
            };
            assert_eq!(Builtin::Median.apply(input), Value::Number(expected));
        }
    }

    #[test]
    fn test_even_predicates() {
        assert_eq!(Builtin::Even.apply(&[1.0, 2.0, 3.0, 4.0]), list(&[2.0, 4.0]));
        assert_eq!(Builtin::SomeEven.apply(&[1.0, 3.0]), Value::Bool(false));
        assert_eq!(Builtin::SomeEven.apply(&[1.0, 4.0]), Value::Bool(true));
        assert_eq!(Builtin::EveryEven.apply(&[2.0, 4.0]), Value::Bool(true));
        assert_eq!(Builtin::EveryEven.apply(&[2.0, 5.0]), Value::Bool(false));
        assert_eq!(Builtin::Has2.apply(&[1.0, 2.0]), Value::Bool(true));
        assert_eq!(Builtin::Has2.apply(&[1.0, 3.0]), Value::Bool(false));
    }

    #[test]
    fn test_slices_and_maps() {
        assert_eq!(Builtin::FirstTwo.apply(&[1.0, 2.0, 3.0]), list(&[1.0, 2.0]));
        assert_eq!(Builtin::LastTwo.apply(&[1.0, 2.0, 3.0]), list(&[2.0, 3.0]));
        assert_eq!(Builtin::LastTwo.apply(&[1.0]), list(&[1.0]));
        assert_eq!(Builtin::FirstTwo.apply(&[]), list(&[]));
        assert_eq!(Builtin::Increment.apply(&[1.0, -1.0]), list(&[2.0, 0.0]));
        assert_eq!(Builtin::NoDupes.apply(&[1.0, 2.0, 1.0, 3.0, 2.0]), list(&[1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_range() {
        assert_eq!(Builtin::Range.apply(&[1.0, 4.0]), list(&[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(Builtin::Range.apply(&[3.0, 3.0]), list(&[3.0]));
        assert_eq!(Builtin::Range.apply(&[4.0, 1.0]), list(&[]));
    }

    #[test]
    fn test_random_stays_in_bounds() {
        for _ in 0..200 {
            let Value::Number(n) = Builtin::Random.apply(&[5.0, 3.0]) else {
                panic!("random must return a number");
            };
            assert!((5.0..8.0).contains(&n));
            assert_eq!(n.fract(), 0.0);
        }
    }

    #[test]
    fn test_identity() {
        assert_eq!(Builtin::Identity.apply(&[4.0]), Value::Number(4.0));
        assert_eq!(Builtin::Identity.apply(&[1.0, 2.0]), list(&[1.0, 2.0]));
    }
}
