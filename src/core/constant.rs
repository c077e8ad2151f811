//! Purpose: Turn decoded roots into the constant term of their monic polynomial.
//! Exports: `constant_term`, `solve`, `Solution`.
//! Role: Pipeline step after document extraction; owns decode-error context.
//! Invariants: constant = (-1)^k * product(roots), product seeded at 1.
//! Invariants: The first root that fails to decode aborts the whole solve.
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::One;

use super::document::RootDocument;
use super::error::{Error, ErrorKind};
use super::radix;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Solution {
    pub roots: Vec<BigUint>,
    pub constant: BigInt,
}

/// Product of `roots`, negated when there is an odd number of them.
pub fn constant_term(roots: &[BigUint]) -> BigInt {
    let product = roots.iter().fold(BigUint::one(), |acc, root| acc * root);
    let sign = if roots.len() % 2 == 1 {
        Sign::Minus
    } else {
        Sign::Plus
    };
    BigInt::from_biguint(sign, product)
}

pub fn solve(doc: &RootDocument) -> Result<Solution, Error> {
    let mut roots = Vec::with_capacity(doc.roots.len());
    for spec in &doc.roots {
        let root = radix::decode(&spec.value, spec.base).map_err(|err| {
            let mut error = Error::new(ErrorKind::Decode)
                .with_message(format!("root {} could not be decoded: {err}", spec.index))
                .with_root(spec.index)
                .with_hint(format!(
                    "Digits for base {} are {}.",
                    err.base(),
                    alphabet_hint(err.base())
                ));
            if let Some(position) = err.position() {
                error = error.with_position(position);
            }
            error.with_source(err)
        })?;
        tracing::debug!(
            index = spec.index,
            base = spec.base,
            bits = root.bits(),
            "decoded root"
        );
        roots.push(root);
    }

    let constant = constant_term(&roots);
    Ok(Solution { roots, constant })
}

fn alphabet_hint(base: u32) -> String {
    if !(radix::MIN_BASE..=radix::MAX_BASE).contains(&base) {
        return format!(
            "undefined; supported bases are {}..={}",
            radix::MIN_BASE,
            radix::MAX_BASE
        );
    }
    match base {
        2..=10 => format!("0-{}", base - 1),
        11 => "0-9 and a (case-insensitive)".to_string(),
        _ => {
            let last = char::from(b'a' + (base - 11) as u8);
            format!("0-9 and a-{last} (case-insensitive)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{alphabet_hint, constant_term, solve};
    use crate::core::document::{RootDocument, RootSpec};
    use crate::core::error::ErrorKind;
    use num_bigint::{BigInt, BigUint};
    use num_traits::Signed;

    fn spec(index: u64, base: u32, value: &str) -> RootSpec {
        RootSpec {
            index,
            base,
            value: value.to_string(),
        }
    }

    fn doc(roots: Vec<RootSpec>) -> RootDocument {
        RootDocument {
            k: roots.len() as u64,
            n: None,
            roots,
        }
    }

    fn uints(values: &[u64]) -> Vec<BigUint> {
        values.iter().copied().map(BigUint::from).collect()
    }

    #[test]
    fn sign_follows_root_count_parity() {
        assert_eq!(constant_term(&[]), BigInt::from(1));
        assert_eq!(constant_term(&uints(&[5])), BigInt::from(-5));
        assert_eq!(constant_term(&uints(&[4, 7])), BigInt::from(28));
        assert_eq!(constant_term(&uints(&[3, 5, 2])), BigInt::from(-30));
        assert_eq!(constant_term(&uints(&[1, 2, 3, 4])), BigInt::from(24));
    }

    #[test]
    fn positive_roots_give_non_negative_constant_for_even_k() {
        for k in 0..8u64 {
            let roots: Vec<BigUint> = (1..=k).map(|v| BigUint::from(v + 1)).collect();
            let constant = constant_term(&roots);
            if k % 2 == 0 {
                assert!(!constant.is_negative(), "k={k}");
            } else {
                assert!(constant.is_negative(), "k={k}");
            }
        }
    }

    #[test]
    fn zero_root_gives_zero_constant() {
        assert_eq!(constant_term(&uints(&[0, 9, 11])), BigInt::from(0));
    }

    #[test]
    fn solve_decodes_mixed_bases() {
        let solution = solve(&doc(vec![spec(1, 2, "11"), spec(2, 2, "101"), spec(3, 2, "10")]))
            .expect("solve");
        assert_eq!(solution.roots, uints(&[3, 5, 2]));
        assert_eq!(solution.constant, BigInt::from(-30));

        let solution = solve(&doc(vec![spec(1, 16, "FF")])).expect("solve");
        assert_eq!(solution.constant, BigInt::from(-255));
    }

    #[test]
    fn solve_keeps_full_precision() {
        let big = "f".repeat(40);
        let solution = solve(&doc(vec![spec(1, 16, &big), spec(2, 16, &big)])).expect("solve");
        let root = BigUint::parse_bytes(big.as_bytes(), 16).expect("reference");
        let expected = BigInt::from(&root * &root);
        assert_eq!(solution.constant, expected);
        assert!(solution.constant.bits() > 300);
    }

    #[test]
    fn solve_reports_first_bad_root() {
        let err = solve(&doc(vec![spec(1, 10, "4"), spec(2, 8, "789"), spec(3, 2, "x")]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.root(), Some(2));
        assert_eq!(err.position(), Some(1));
        assert_eq!(err.hint(), Some("Digits for base 8 are 0-7."));
    }

    #[test]
    fn solve_reports_unsupported_base_without_position() {
        let err = solve(&doc(vec![spec(1, 40, "1")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.root(), Some(1));
        assert_eq!(err.position(), None);
    }

    #[test]
    fn alphabet_hint_names_last_digit() {
        assert_eq!(alphabet_hint(2), "0-1");
        assert_eq!(alphabet_hint(11), "0-9 and a (case-insensitive)");
        assert_eq!(alphabet_hint(12), "0-9 and a-b (case-insensitive)");
        assert_eq!(alphabet_hint(16), "0-9 and a-f (case-insensitive)");
        assert_eq!(alphabet_hint(36), "0-9 and a-z (case-insensitive)");
    }
}
