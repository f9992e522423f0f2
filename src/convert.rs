//! The hook schema-generated types implement to become printable.
//!
//! Generated code builds one record per node and delegates each field to the
//! field type's own `ToPretty` impl; the blanket impls below cover the
//! primitive and container slots.
use crate::value::{Array, Leaf, PrettyValue};

pub trait ToPretty {
    /// Full form: named fields everywhere.
    fn pretty_tree(&self) -> PrettyValue<'_>;

    /// Compact form. Types with a short positional convention override this
    /// to return an abbreviated record.
    fn abbreviated_tree(&self) -> PrettyValue<'_> {
        self.pretty_tree()
    }
}

impl ToPretty for str {
    fn pretty_tree(&self) -> PrettyValue<'_> {
        Leaf::string_const(self).into()
    }
}

impl ToPretty for String {
    fn pretty_tree(&self) -> PrettyValue<'_> {
        self.as_str().pretty_tree()
    }
}

macro_rules! other_const_impls {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToPretty for $ty {
                fn pretty_tree(&self) -> PrettyValue<'_> {
                    Leaf::other_const(self.to_string()).into()
                }
            }
        )*
    };
}

other_const_impls!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: ToPretty> ToPretty for Option<T> {
    fn pretty_tree(&self) -> PrettyValue<'_> {
        match self {
            Some(inner) => inner.pretty_tree(),
            None => Leaf::absent().into(),
        }
    }

    fn abbreviated_tree(&self) -> PrettyValue<'_> {
        match self {
            Some(inner) => inner.abbreviated_tree(),
            None => Leaf::absent().into(),
        }
    }
}

impl<T: ToPretty> ToPretty for [T] {
    fn pretty_tree(&self) -> PrettyValue<'_> {
        self.iter().map(T::pretty_tree).collect::<Array<'_>>().into()
    }

    fn abbreviated_tree(&self) -> PrettyValue<'_> {
        self.iter().map(T::abbreviated_tree).collect::<Array<'_>>().into()
    }
}

impl<T: ToPretty> ToPretty for Vec<T> {
    fn pretty_tree(&self) -> PrettyValue<'_> {
        self.as_slice().pretty_tree()
    }

    fn abbreviated_tree(&self) -> PrettyValue<'_> {
        self.as_slice().abbreviated_tree()
    }
}

impl<T: ToPretty + ?Sized> ToPretty for Box<T> {
    fn pretty_tree(&self) -> PrettyValue<'_> {
        (**self).pretty_tree()
    }

    fn abbreviated_tree(&self) -> PrettyValue<'_> {
        (**self).abbreviated_tree()
    }
}

impl<T: ToPretty + ?Sized> ToPretty for &T {
    fn pretty_tree(&self) -> PrettyValue<'_> {
        (**self).pretty_tree()
    }

    fn abbreviated_tree(&self) -> PrettyValue<'_> {
        (**self).abbreviated_tree()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderOptions, render};
    use crate::value::{Color, Record};

    // Shaped like the output of a schema compiler for
    // `expr = BinOp(id op, expr left, expr right) | Const(int value) | Var(string? name)`.
    enum Expr {
        BinOp { op: &'static str, left: Box<Expr>, right: Box<Expr> },
        Const(i64),
        Var(Option<String>),
    }

    impl ToPretty for Expr {
        fn pretty_tree(&self) -> PrettyValue<'_> {
            let mut record = match self {
                Expr::BinOp { .. } => Record::new("expr.BinOp"),
                Expr::Const(_) => Record::new("expr.Const"),
                Expr::Var(_) => Record::new("expr.Var"),
            };
            match self {
                Expr::BinOp { op, left, right } => record
                    .add_field("op", Leaf::user_type(*op))
                    .and_then(|()| record.add_field("left", left.pretty_tree()))
                    .and_then(|()| record.add_field("right", right.pretty_tree())),
                Expr::Const(value) => record.add_field("value", value.pretty_tree()),
                Expr::Var(name) => record.add_field("name", name.pretty_tree()),
            }
            .unwrap();
            record.into()
        }

        fn abbreviated_tree(&self) -> PrettyValue<'_> {
            match self {
                Expr::Const(value) => value.pretty_tree(),
                Expr::BinOp { op, left, right } => {
                    let mut record = Record::abbreviated("", "{", "}");
                    let children = [
                        Leaf::user_type(*op).into(),
                        left.abbreviated_tree(),
                        right.abbreviated_tree(),
                    ];
                    for child in children {
                        record.add_unnamed_child(child).unwrap();
                    }
                    record.into()
                }
                Expr::Var(_) => self.pretty_tree(),
            }
        }
    }

    fn sample() -> Expr {
        Expr::BinOp {
            op: "+",
            left: Box::new(Expr::Const(1)),
            right: Box::new(Expr::Var(None)),
        }
    }

    #[test]
    fn primitives_pick_their_colors() {
        assert_eq!("x".pretty_tree().color(), Some(Color::StringConst));
        assert_eq!(7_u8.pretty_tree().color(), Some(Color::OtherConst));
        assert_eq!(true.pretty_tree().as_leaf().map(Leaf::text), Some("true"));
        assert!(None::<String>.pretty_tree().as_leaf().is_some_and(Leaf::is_absent));
    }

    #[test]
    fn vec_becomes_array() {
        let xs = vec![1, 2, 3];
        let tree = xs.pretty_tree();
        assert_eq!(tree.as_array().map(Array::len), Some(3));

        let empty = Vec::<i32>::new();
        let tree = empty.pretty_tree();
        assert_eq!(tree.as_array().map(Array::is_empty), Some(true));
    }

    #[test]
    fn generated_style_type_renders_both_forms() {
        let expr = sample();
        let options = RenderOptions::default();
        assert_eq!(
            render(&expr.pretty_tree(), &options),
            "(expr.BinOp op:+ left:(expr.Const value:1) right:(expr.Var name:_))"
        );
        assert_eq!(render(&expr.abbreviated_tree(), &options), "{+ 1 (expr.Var name:_)}");
    }
}
