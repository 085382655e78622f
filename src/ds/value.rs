//! 动态类型的值，用于在同一个集合中混放不同类型。
//! 数字之间可以互相比较，字符串之间、字节串之间可以比较，其余组合都不可比较。

use std::{cmp::Ordering, fmt};

use atoi::FromRadix10SignedChecked;
use bytes::Bytes;

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    /// 非 utf8 的原始字节
    Bytes(Bytes),
}

impl Value {
    /// 解析一个原始参数：整段是十进制整数时为 `Int`，
    /// 否则是合法 utf8 时为 `Str`，再否则为 `Bytes`
    pub fn from_token(token: &[u8]) -> Value {
        if token.iter().any(u8::is_ascii_digit) {
            if let (Some(n), used) = i64::from_radix_10_signed_checked(token) {
                if used == token.len() {
                    return Value::Int(n);
                }
            }
        }
        match std::str::from_utf8(token) {
            Ok(s) => Value::Str(s.to_string()),
            Err(_) => Value::Bytes(Bytes::copy_from_slice(token)),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => cmp_int_float(*a, *b),
            (Value::Float(a), Value::Int(b)) => cmp_int_float(*b, *a).map(Ordering::reverse),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// 整数与浮点数的精确比较。
/// 不能把 i64 转成 f64 再比：超过 2^53 的整数会被舍入，相等关系就不再传递
fn cmp_int_float(a: i64, b: f64) -> Option<Ordering> {
    if b.is_nan() {
        return None;
    }
    if b.is_infinite() {
        return Some(if b > 0.0 { Ordering::Less } else { Ordering::Greater });
    }
    let whole = b.trunc();
    // i128 足以容纳 i64 范围，超出部分饱和转换后仍然在 i64 之外
    match (a as i128).cmp(&(whole as i128)) {
        Ordering::Equal => 0f64.partial_cmp(&(b - whole)),
        ord => Some(ord),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => {
                f.write_str("b\"")?;
                for &byte in b.iter() {
                    write!(f, "{}", std::ascii::escape_default(byte))?;
                }
                f.write_str("\"")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use bytes::Bytes;

    use super::Value;
    use crate::ds::multiset::MultiSet;

    #[test]
    fn ordering() {
        assert!(Value::from(1) < Value::from(2));
        assert!(Value::from(1) < Value::from(1.5));
        assert_eq!(Value::from(2), Value::from(2.0));
        assert!(Value::from("a") < Value::from("b"));
        assert_eq!(Value::from(1).partial_cmp(&Value::from("1")), None);
        assert_ne!(Value::from(1), Value::from("1"));
        assert_eq!(
            Value::from(Bytes::from_static(b"a")).partial_cmp(&Value::from("a")),
            None
        );
        assert_eq!(Value::from(f64::NAN).partial_cmp(&Value::from(1)), None);
        assert_eq!(
            Value::from(Bytes::from_static(b"a")).partial_cmp(&Value::from(Bytes::from_static(b"b"))),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn int_float_beyond_f64_precision() {
        let big = 1i64 << 53;
        assert_eq!(Value::from(big), Value::from(big as f64));
        assert!(Value::from(big + 1) > Value::from(big as f64));
        assert!(Value::from(big as f64) < Value::from(big + 1));
        assert_ne!(Value::from(big + 1), Value::from(big as f64));
        assert!(Value::Int(i64::MAX) < Value::from(i64::MAX as f64));
        assert!(Value::Int(i64::MIN) == Value::from(i64::MIN as f64));
        assert!(Value::Int(i64::MIN) > Value::from(-1e300));
        assert!(Value::Int(i64::MAX) < Value::from(f64::INFINITY));
        assert!(Value::Int(i64::MIN) > Value::from(f64::NEG_INFINITY));
        assert!(Value::from(-1) > Value::from(-1.5));
        assert!(Value::from(-2) < Value::from(-1.5));
        assert!(Value::from(1) < Value::from(1.5));
        assert!(Value::from(2) > Value::from(1.5));
    }

    #[test]
    fn count_agrees_with_equality_at_precision_edge() {
        let big = 1i64 << 53;
        let mut ms = MultiSet::new();
        ms.insert(Value::from(big + 1)).unwrap();
        ms.insert(Value::from(big)).unwrap();
        ms.insert(Value::from(big as f64)).unwrap();
        let query = Value::from(big as f64);
        assert_eq!(ms.count(&query), 2);
        assert_eq!(ms.iter().filter(|v| **v == query).count(), 2);
        assert_eq!(ms.count(&Value::from(big + 1)), 1);
        assert_eq!(ms.iter().last(), Some(&Value::from(big + 1)));
    }

    #[test]
    fn from_token() {
        assert_eq!(Value::from_token(b"42"), Value::Int(42));
        assert_eq!(Value::from_token(b"-7"), Value::Int(-7));
        assert_eq!(Value::from_token(b"42x"), Value::from("42x"));
        assert_eq!(Value::from_token(b"-"), Value::from("-"));
        assert_eq!(Value::from_token(b""), Value::from(""));
        assert_eq!(Value::from_token(b"99999999999999999999"), Value::from("99999999999999999999"));
        assert_eq!(
            Value::from_token(&[0xff, 0x00]),
            Value::Bytes(Bytes::from_static(&[0xff, 0x00]))
        );
    }

    #[test]
    fn display() {
        assert_eq!(Value::from(3).to_string(), "3");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from("x").to_string(), "\"x\"");
        assert_eq!(Value::from(Bytes::from_static(&[b'a', 0xff])).to_string(), "b\"a\\xff\"");
        assert_eq!(Value::from("x").type_name(), "str");
    }
}
