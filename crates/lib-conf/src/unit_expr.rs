//! Unit expression parser.
//!
//! Settings files and the command line name units with short expressions:
//!
//! ```text
//! mm          1/mm        mm^-1       mm**-1      mm-1
//! nm s^-1     nm / s      nm*mm       1 / (mm s)  waves
//! cy/mm       wave(0.5)   nm / wave(10.6)
//! ```
//!
//! Names resolve through the unit registry, with `waves`/`wave`/`λ` standing
//! for the reference wavelength; `wave(<microns>)` names a wave unit of any
//! other wavelength. An expression that is itself a registered name (such as
//! `cy/mm`) resolves directly. Operators associate to the left, so `a / b c`
//! is `(a / b) * c`; use parentheses to group a denominator.
//!
//! Powers written straight after a name (`mm2`, `mm-1`) are exponents. The
//! literal `1` and parenthesised groups only take `^` or `**` exponents, so a
//! scale factor such as `10/mm` is rejected rather than read as `1^0 / mm`.

use crate::error::{ConfError, ConfResult};
use crate::resolve::{is_wave_alias, resolve_unit_in, standard_registry, UnitToken};
use lib_types::{wavelengths, Unit, UnitRegistry};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{all_consuming, map, map_res, opt, recognize, value, verify},
    multi::many0,
    number::complete::double,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};
use std::fmt;

/// Parsed unit expression, before names are resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum UnitExpr {
    /// The literal `1`, as in `1/mm`.
    One,
    Name(String),
    /// `wave(<microns>)`.
    Wave(f64),
    Pow(Box<UnitExpr>, i32),
    Product(Box<UnitExpr>, Box<UnitExpr>),
    Quotient(Box<UnitExpr>, Box<UnitExpr>),
}

impl UnitExpr {
    /// Resolve every name and combine the result into a unit.
    ///
    /// Fails with [`ConfError::UnitExpr`] if a combined power overflows.
    pub fn evaluate(&self, registry: &UnitRegistry, wavelength: &Unit) -> ConfResult<Unit> {
        let overflow = || ConfError::unit_expr(self.to_string(), "exponent out of range");

        match self {
            Self::One => Ok(Unit::dimensionless()),
            Self::Name(name) => resolve_unit_in(registry, UnitToken::Name(name.clone()), wavelength),
            Self::Wave(microns) if microns.is_finite() && *microns > 0.0 => {
                Ok(wavelengths::mkwvl(*microns))
            }
            Self::Wave(_) => Err(ConfError::unit_expr(
                self.to_string(),
                "wavelength must be a positive number of microns",
            )),
            Self::Pow(base, power) => base
                .evaluate(registry, wavelength)?
                .checked_powi(*power)
                .ok_or_else(overflow),
            Self::Product(lhs, rhs) => lhs
                .evaluate(registry, wavelength)?
                .checked_mul(&rhs.evaluate(registry, wavelength)?)
                .ok_or_else(overflow),
            Self::Quotient(lhs, rhs) => lhs
                .evaluate(registry, wavelength)?
                .checked_div(&rhs.evaluate(registry, wavelength)?)
                .ok_or_else(overflow),
        }
    }
}

impl fmt::Display for UnitExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => f.write_str("1"),
            Self::Name(name) => f.write_str(name),
            Self::Wave(microns) => write!(f, "wave({})", microns),
            Self::Pow(base, power) => write!(f, "({})^{}", base, power),
            Self::Product(lhs, rhs) => write!(f, "({} {})", lhs, rhs),
            Self::Quotient(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
        }
    }
}

/// Parse an expression into its syntax tree.
pub fn parse_expr(expr: &str) -> ConfResult<UnitExpr> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(ConfError::unit_expr(expr, "empty unit expression"));
    }

    let (_, tree) = all_consuming(product).parse(trimmed).map_err(|e| {
        let message = match e {
            nom::Err::Incomplete(_) => "incomplete input".to_string(),
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                let preview: String = e.input.chars().take(20).collect();
                format!("unexpected input at '{}'", preview)
            }
        };
        ConfError::unit_expr(expr, message)
    })?;

    Ok(tree)
}

/// Parse and resolve a unit expression against the standard registry.
pub fn parse_unit_expr(expr: &str, wavelength: &Unit) -> ConfResult<Unit> {
    parse_unit_expr_in(standard_registry(), expr, wavelength)
}

/// Parse and resolve a unit expression against a caller-supplied registry.
pub fn parse_unit_expr_in(
    registry: &UnitRegistry,
    expr: &str,
    wavelength: &Unit,
) -> ConfResult<Unit> {
    let trimmed = expr.trim();
    if registry.contains(trimmed) {
        return resolve_unit_in(registry, trimmed, wavelength);
    }
    parse_expr(expr)?.evaluate(registry, wavelength)
}

// ============================================================================
// Nom Parsers (nom 8)
// ============================================================================

#[derive(Clone, Copy, Debug)]
enum Op {
    Mul,
    Div,
}

fn product(input: &str) -> IResult<&str, UnitExpr> {
    let (input, first) = factor(input)?;
    let (input, rest) = many0(pair(operator, factor)).parse(input)?;

    let tree = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        Op::Mul => UnitExpr::Product(Box::new(acc), Box::new(rhs)),
        Op::Div => UnitExpr::Quotient(Box::new(acc), Box::new(rhs)),
    });
    Ok((input, tree))
}

fn operator(input: &str) -> IResult<&str, Op> {
    alt((
        value(
            Op::Mul,
            delimited(multispace0, alt((char('*'), char('.'), char('·'))), multispace0),
        ),
        value(Op::Div, delimited(multispace0, char('/'), multispace0)),
        value(Op::Mul, multispace1),
    ))
    .parse(input)
}

fn factor(input: &str) -> IResult<&str, UnitExpr> {
    alt((
        pair(group, opt(caret_exponent)),
        pair(value(UnitExpr::One, char('1')), opt(caret_exponent)),
        pair(alt((wave_literal, name)), opt(exponent)),
    ))
    .map(|(base, power)| match power {
        Some(p) => UnitExpr::Pow(Box::new(base), p),
        None => base,
    })
    .parse(input)
}

fn group(input: &str) -> IResult<&str, UnitExpr> {
    delimited(
        pair(char('('), multispace0),
        product,
        pair(multispace0, char(')')),
    )
    .parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphabetic() || c == '_').parse(input)
}

fn name(input: &str) -> IResult<&str, UnitExpr> {
    map(identifier, |s: &str| UnitExpr::Name(s.to_string())).parse(input)
}

fn wave_literal(input: &str) -> IResult<&str, UnitExpr> {
    map(
        preceded(
            verify(identifier, |s: &str| is_wave_alias(s)),
            delimited(
                pair(char('('), multispace0),
                double,
                pair(multispace0, char(')')),
            ),
        ),
        UnitExpr::Wave,
    )
    .parse(input)
}

fn caret_exponent(input: &str) -> IResult<&str, i32> {
    preceded(
        pair(multispace0, alt((tag("**"), tag("^")))),
        preceded(multispace0, signed_int),
    )
    .parse(input)
}

fn exponent(input: &str) -> IResult<&str, i32> {
    // Generic notation writes powers directly after the name: `mm2`, `mm-1`.
    alt((caret_exponent, signed_int)).parse(input)
}

fn signed_int(input: &str) -> IResult<&str, i32> {
    map_res(
        recognize(pair(opt(alt((char('-'), char('+')))), digit1)),
        |s: &str| s.parse::<i32>(),
    )
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::units::{mm, nm, s};
    use lib_types::wavelengths::{co2, hene, mkwvl};
    use lib_types::Notation;

    fn parse(expr: &str) -> Unit {
        parse_unit_expr(expr, &hene()).unwrap()
    }

    #[test]
    fn test_reciprocal_spellings_agree() {
        let expected = mm().recip();
        for expr in ["1/mm", "1 / mm", "mm^-1", "mm ** -1", "mm-1", "(mm)^-1"] {
            assert_eq!(parse(expr), expected, "expression {:?}", expr);
        }
    }

    #[test]
    fn test_products_and_quotients() {
        assert_eq!(parse("nm s^-1"), &nm() / &s());
        assert_eq!(parse("nm / s"), &nm() / &s());
        assert_eq!(parse("nm*mm"), &nm() * &mm());
        assert_eq!(parse("1 / (mm s)"), (&mm() * &s()).recip());
        assert_eq!(parse("mm2"), mm().powi(2));
    }

    #[test]
    fn test_generic_rendering_parses_back() {
        let units = [mm().recip(), &nm() / &s(), mm().powi(2), (&mm() * &s()).recip(), hene()];
        for unit in units {
            let text = unit.to_string_in(Notation::Generic);
            assert_eq!(parse(&text), unit, "rendered as {:?}", text);
        }
    }

    #[test]
    fn test_wave_aliases() {
        assert_eq!(parse("waves"), hene());
        assert_eq!(parse("λ"), hene());
        assert_eq!(parse("nm / wave"), &nm() / &hene());
    }

    #[test]
    fn test_syntax_errors() {
        for expr in ["", "   ", "mm /", "(mm", "mm ^", "2/mm", "mm $", "10/mm", "100 nm", "1 2"] {
            let err = parse_unit_expr(expr, &hene()).unwrap_err();
            assert!(matches!(err, ConfError::UnitExpr { .. }), "{:?} gave {:?}", expr, err);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = parse_unit_expr("furlong / fortnight", &hene()).unwrap_err();
        assert!(matches!(err, ConfError::UnresolvedUnitName(ref n) if n == "furlong"));
    }

    #[test]
    fn test_literal_one_takes_only_caret_powers() {
        assert_eq!(parse("1^2 / mm"), mm().recip());
        assert_eq!(parse("(mm)^2"), mm().powi(2));
        assert!(parse_unit_expr("(mm)2", &hene()).is_err());
    }

    #[test]
    fn test_exponent_overflow_is_an_error() {
        for expr in ["(mm^2147483647)^2", "mm^2147483647 mm", "1 / mm^-2147483648"] {
            let err = parse_unit_expr(expr, &hene()).unwrap_err();
            assert!(matches!(err, ConfError::UnitExpr { .. }), "{:?} gave {:?}", expr, err);
        }
        assert_eq!(parse("mm^2147483647"), mm().powi(i32::MAX));
    }

    #[test]
    fn test_registered_names_with_slashes() {
        assert_eq!(parse("cy/mm"), mm().recip());
        assert_eq!(parse(" lp/mm "), mm().recip());
    }

    #[test]
    fn test_wave_literal() {
        assert_eq!(parse("wave(0.5)"), mkwvl(0.5));
        assert_eq!(parse("waves( 10.6 )"), co2());
        assert_eq!(parse("nm / wave(0.5)"), &nm() / &mkwvl(0.5));
        assert_eq!(parse("wave(0.5)2"), mkwvl(0.5).powi(2));
        // A bare alias still means the reference wavelength.
        assert_eq!(parse("wave"), hene());

        for expr in ["wave(0)", "wave(-1)", "wave(inf)", "wave()", "mm(0.5)"] {
            assert!(parse_unit_expr(expr, &hene()).is_err(), "{:?}", expr);
        }
    }
}
