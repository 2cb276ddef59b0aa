#[cfg(test)]
mod tests {
    use num_bigint::{BigInt, BigUint};
    use num_traits::{One, Zero};
    use proptest::prelude::*;
    use std::collections::HashMap;
    use toysym::{Resolve, SymWord};

    fn modulus() -> BigUint {
        BigUint::one() << 256
    }

    fn big(bytes: [u8; 32]) -> BigUint {
        BigUint::from_bytes_be(&bytes)
    }

    fn word(v: &BigUint) -> SymWord {
        SymWord::lit(v.clone())
    }

    fn val(w: &SymWord) -> BigUint {
        w.force_lit().unwrap()
    }

    fn signed(v: &BigUint) -> BigInt {
        if *v >= BigUint::one() << 255 {
            BigInt::from(v.clone()) - BigInt::from(modulus())
        } else {
            BigInt::from(v.clone())
        }
    }

    fn unsigned(v: BigInt) -> BigUint {
        let m = BigInt::from(modulus());
        (((v % &m) + &m) % &m).to_biguint().unwrap()
    }

    /// Evaluates a word built from the variables `a` and `b` at the given values.
    fn eval_at(w: &SymWord, a: &BigUint, b: &BigUint) -> BigUint {
        let mut model = HashMap::new();
        model.insert("a".to_string(), BigInt::from(a.clone()));
        model.insert("b".to_string(), BigInt::from(b.clone()));
        w.expr().eval(&model).unwrap().to_biguint().unwrap()
    }

    proptest! {
        #[test]
        fn prop_ring_ops_wrap(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let (a, b) = (big(a), big(b));
            let m = modulus();
            prop_assert_eq!(val(&(&word(&a) + &word(&b))), (&a + &b) % &m);
            prop_assert_eq!(val(&(&word(&a) * &word(&b))), (&a * &b) % &m);
            prop_assert_eq!(val(&(&word(&a) - &word(&b))), (&a + &m - &b) % &m);
        }

        #[test]
        fn prop_unsigned_division(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let (a, b) = (big(a), big(b));
            let (q, r) = if b.is_zero() {
                (BigUint::zero(), BigUint::zero())
            } else {
                (&a / &b, &a % &b)
            };
            prop_assert_eq!(val(&(&word(&a) / &word(&b))), q);
            prop_assert_eq!(val(&(&word(&a) % &word(&b))), r);
        }

        #[test]
        fn prop_signed_division_truncates(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let (a, b) = (big(a), big(b));
            let (sa, sb) = (signed(&a), signed(&b));
            let (q, r) = if sb.is_zero() {
                (BigInt::zero(), BigInt::zero())
            } else {
                (&sa / &sb, &sa % &sb)
            };
            prop_assert_eq!(val(&word(&a).sdiv(&word(&b))), unsigned(q));
            prop_assert_eq!(val(&word(&a).smod(&word(&b))), unsigned(r));
        }

        #[test]
        fn prop_fused_modular(a in any::<[u8; 32]>(), b in any::<[u8; 32]>(), z in any::<[u8; 32]>()) {
            let (a, b, z) = (big(a), big(b), big(z));
            let (add, mul) = if z.is_zero() {
                (BigUint::zero(), BigUint::zero())
            } else {
                ((&a + &b) % &z, (&a * &b) % &z)
            };
            prop_assert_eq!(val(&word(&a).addmod(&word(&b), &word(&z))), add);
            prop_assert_eq!(val(&word(&a).mulmod(&word(&b), &word(&z))), mul);
        }

        #[test]
        fn prop_shifts(a in any::<[u8; 32]>(), n in 0u64..300) {
            let a = big(a);
            let m = modulus();
            let shift = SymWord::from_u64(n);
            let (left, right) = if n < 256 {
                ((&a << n as usize) % &m, &a >> n as usize)
            } else {
                (BigUint::zero(), BigUint::zero())
            };
            prop_assert_eq!(val(&(&word(&a) << &shift)), left);
            prop_assert_eq!(val(&(&word(&a) >> &shift)), right);

            let arithmetic = unsigned(signed(&a) >> n as usize);
            prop_assert_eq!(val(&word(&a).sar(&shift)), arithmetic);
        }

        #[test]
        fn prop_rotations_invert(a in any::<[u8; 32]>(), n in 0u64..600) {
            let a = big(a);
            let shift = SymWord::from_u64(n);
            let rotated = word(&a).rotl(&shift);
            prop_assert_eq!(val(&rotated.rotr(&shift)), a.clone());
            prop_assert_eq!(val(&rotated.popcount()), BigUint::from(a.count_ones()));
        }

        #[test]
        fn prop_bitwise(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let (a, b) = (big(a), big(b));
            let mask = modulus() - BigUint::one();
            prop_assert_eq!(val(&(&word(&a) & &word(&b))), &a & &b);
            prop_assert_eq!(val(&(&word(&a) | &word(&b))), &a | &b);
            prop_assert_eq!(val(&(&word(&a) ^ &word(&b))), &a ^ &b);
            prop_assert_eq!(val(&!&word(&a)), &a ^ &mask);
        }

        #[test]
        fn prop_symbolic_formulas_agree_with_literals(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            let (a, b) = (big(a), big(b));
            let (x, y) = (SymWord::var("a"), SymWord::var("b"));
            let (la, lb) = (word(&a), word(&b));

            prop_assert_eq!(eval_at(&(&x + &y), &a, &b), val(&(&la + &lb)));
            prop_assert_eq!(eval_at(&(&x - &y), &a, &b), val(&(&la - &lb)));
            prop_assert_eq!(eval_at(&x.sdiv(&y), &a, &b), val(&la.sdiv(&lb)));
            prop_assert_eq!(eval_at(&x.smod(&y), &a, &b), val(&la.smod(&lb)));
            prop_assert_eq!(eval_at(&x.slt(&y), &a, &b), val(&la.slt(&lb)));
            prop_assert_eq!(eval_at(&x.sgt(&y), &a, &b), val(&la.sgt(&lb)));
            prop_assert_eq!(eval_at(&!&x, &a, &b), val(&!&la));
            prop_assert_eq!(eval_at(&x.addmod(&x, &y), &a, &b), val(&la.addmod(&la, &lb)));
            prop_assert_eq!(eval_at(&x.eq_word(&y), &a, &b), val(&la.eq_word(&lb)));
        }

        #[test]
        fn prop_symbolic_shift_amounts(a in any::<[u8; 32]>(), n in 0u64..300) {
            let a = big(a);
            let n = BigUint::from(n);
            let (x, s) = (SymWord::var("a"), SymWord::var("b"));
            let (la, ls) = (word(&a), word(&n));
            prop_assert_eq!(eval_at(&(&x << &s), &a, &n), val(&(&la << &ls)));
            prop_assert_eq!(eval_at(&(&x >> &s), &a, &n), val(&(&la >> &ls)));
            prop_assert_eq!(eval_at(&x.sar(&s), &a, &n), val(&la.sar(&ls)));
            prop_assert_eq!(eval_at(&x.byte(&s), &a, &n), val(&la.byte(&ls)));
            prop_assert_eq!(eval_at(&x.signextend(&s), &a, &n), val(&la.signextend(&ls)));
        }
    }

    #[test]
    fn test_signed_comparison_boundary() {
        let x = SymWord::lit((BigUint::one() << 255) - BigUint::one());
        let y = SymWord::lit(BigUint::one() << 255);
        assert_eq!(val(&x.slt(&y)), BigUint::zero());
        assert_eq!(val(&y.slt(&x)), BigUint::one());
        assert_eq!(val(&y.sgt(&x)), BigUint::zero());
    }

    #[test]
    fn test_sdiv_overflow_case() {
        // -2^255 / -1 has no positive counterpart and wraps back to -2^255
        let min = SymWord::lit(BigUint::one() << 255);
        let minus_one = SymWord::lit(modulus() - BigUint::one());
        assert_eq!(val(&min.sdiv(&minus_one)), BigUint::one() << 255);
        assert_eq!(val(&min.smod(&minus_one)), BigUint::zero());
    }

    #[test]
    fn test_modular_ops_with_zero_modulus() {
        let a = SymWord::from_u64(10);
        let b = SymWord::from_u64(20);
        assert_eq!(val(&a.addmod(&b, &SymWord::zero())), BigUint::zero());
        assert_eq!(val(&a.mulmod(&b, &SymWord::zero())), BigUint::zero());

        // Symbolic operands with a zero modulus still collapse
        let x = SymWord::var("x");
        assert_eq!(val(&x.mulmod(&b, &SymWord::zero())), BigUint::zero());
    }

    #[test]
    fn test_mulmod_does_not_wrap_intermediate() {
        let max = SymWord::lit(modulus() - BigUint::one());
        let seven = SymWord::from_u64(7);
        let expected = ((modulus() - BigUint::one()) * (modulus() - BigUint::one())) % 7u32;
        assert_eq!(val(&max.mulmod(&max, &seven)), expected);
        let sum = ((modulus() - BigUint::one()) * 2u32) % 7u32;
        assert_eq!(val(&max.addmod(&max, &seven)), sum);
    }

    #[test]
    fn test_exp_wraps() {
        let two = SymWord::from_u64(2);
        assert_eq!(val(&two.exp(&SymWord::from_u64(255))), BigUint::one() << 255);
        assert_eq!(val(&two.exp(&SymWord::from_u64(256))), BigUint::zero());
        assert_eq!(val(&SymWord::zero().exp(&SymWord::zero())), BigUint::one());
    }

    #[test]
    fn test_byte_and_signextend() {
        let x = SymWord::from_u64(0x1280);
        assert_eq!(val(&x.byte(&SymWord::from_u64(31))), BigUint::from(0x80u32));
        assert_eq!(val(&x.byte(&SymWord::from_u64(30))), BigUint::from(0x12u32));
        assert_eq!(val(&x.byte(&SymWord::from_u64(32))), BigUint::zero());

        let extended = x.signextend(&SymWord::zero());
        assert_eq!(val(&extended), modulus() - BigUint::from(0x80u32));
        assert_eq!(val(&x.signextend(&SymWord::from_u64(1))), BigUint::from(0x1280u32));
        assert_eq!(val(&x.signextend(&SymWord::from_u64(40))), BigUint::from(0x1280u32));
    }

    #[test]
    fn test_bit_test() {
        let x = SymWord::lit(BigUint::one() << 200);
        assert_eq!(val(&x.test_bit(&SymWord::from_u64(200))), BigUint::one());
        assert_eq!(val(&x.test_bit(&SymWord::from_u64(199))), BigUint::zero());
        assert_eq!(val(&x.test_bit(&SymWord::from_u64(300))), BigUint::zero());
    }

    #[test]
    fn test_sym_eq_is_a_formula() {
        let x = SymWord::var("x");
        let y = SymWord::var("y");
        assert!(x.sym_eq(&y).as_lit().is_none());
        assert_eq!(x.sym_eq(&x).as_lit(), Some(true));
        assert!(x.try_eq(&y).is_err());
    }
}
