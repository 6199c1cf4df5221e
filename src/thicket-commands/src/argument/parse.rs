//! Positional argument parsing and typed access.

use super::{ArgumentKind, ArgumentSpec, Conditional, is_resource_id};
use crate::error::{CommandError, Result};

/// A converted argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(String),
    /// Raw player name or selector, resolved when read.
    Selector(String),
    /// Namespaced material or item identifier.
    Resource(String),
}

/// Types that can be read out of an [`ArgValue`].
pub trait FromArgument: Sized {
    /// Name used in type mismatch errors.
    const TYPE_NAME: &'static str;

    fn from_value(value: &ArgValue) -> Option<Self>;
}

impl FromArgument for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_value(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromArgument for i32 {
    const TYPE_NAME: &'static str = "integer";

    fn from_value(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromArgument for i64 {
    const TYPE_NAME: &'static str = "long";

    fn from_value(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Long(n) => Some(*n),
            ArgValue::Int(n) => Some(i64::from(*n)),
            _ => None,
        }
    }
}

impl FromArgument for f32 {
    const TYPE_NAME: &'static str = "decimal";

    fn from_value(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromArgument for f64 {
    const TYPE_NAME: &'static str = "decimal";

    fn from_value(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Double(n) => Some(*n),
            ArgValue::Float(n) => Some(f64::from(*n)),
            _ => None,
        }
    }
}

impl FromArgument for String {
    const TYPE_NAME: &'static str = "text";

    fn from_value(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Text(s) | ArgValue::Selector(s) | ArgValue::Resource(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Arguments supplied to one invocation, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    labels: Vec<String>,
    values: Vec<ArgValue>,
    raw: Vec<String>,
}

impl Arguments {
    /// Convert `tokens` positionally against `specs`.
    ///
    /// Stops at the first required argument without a token or the first
    /// token that fails conversion. A greedy argument takes every remaining
    /// token. Tokens left after the last spec are an error.
    pub fn parse(specs: &[ArgumentSpec], tokens: &[String]) -> Result<Self> {
        let mut values = Vec::with_capacity(specs.len());
        let mut raw = Vec::with_capacity(specs.len());
        let mut index = 0;

        for spec in specs {
            if index >= tokens.len() {
                if spec.required {
                    return Err(CommandError::missing(&spec.label));
                }
                continue;
            }

            let token = if spec.kind == ArgumentKind::Greedy {
                let joined = tokens[index..].join(" ");
                index = tokens.len();
                joined
            } else {
                index += 1;
                tokens[index - 1].clone()
            };

            values.push(convert(spec, &token)?);
            raw.push(token);
        }

        if index < tokens.len() {
            return Err(CommandError::TooManyArguments {
                input: tokens[index..].join(" "),
            });
        }

        Ok(Self {
            labels: specs.iter().map(|spec| spec.label.clone()).collect(),
            values,
            raw,
        })
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.labels.iter().position(|label| label == name)
    }

    fn value(&self, name: &str) -> Option<(usize, &ArgValue)> {
        let index = self.index_of(name)?;
        self.values.get(index).map(|value| (index, value))
    }

    /// Number of arguments actually supplied.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if the argument's position was reached by the tokens.
    pub fn is_provided(&self, name: &str) -> bool {
        self.index_of(name)
            .is_some_and(|index| index < self.values.len())
    }

    /// Returns true if the argument was supplied and equals `expected`.
    pub fn is_equal<T: FromArgument + PartialEq>(&self, name: &str, expected: &T) -> bool {
        self.value(name)
            .and_then(|(_, value)| T::from_value(value))
            .is_some_and(|actual| actual == *expected)
    }

    /// Read an argument, failing if it is absent or of another type.
    pub fn get<T: FromArgument>(&self, name: &str) -> Result<T> {
        let (index, value) = self
            .value(name)
            .ok_or_else(|| CommandError::missing(name))?;

        T::from_value(value)
            .ok_or_else(|| CommandError::invalid_type(name, &self.raw[index], T::TYPE_NAME))
    }

    /// Read an argument, falling back to `default`.
    pub fn get_or<T: FromArgument>(&self, name: &str, default: T) -> T {
        self.get(name).unwrap_or(default)
    }

    /// The raw token(s) supplied for an argument.
    pub fn raw(&self, name: &str) -> Option<&str> {
        let index = self.index_of(name)?;
        self.raw.get(index).map(String::as_str)
    }

    /// Raw selector text of a player argument.
    pub(crate) fn selector(&self, name: &str) -> Result<&str> {
        match self.value(name) {
            Some((_, ArgValue::Selector(input))) => Ok(input),
            Some((index, _)) => Err(CommandError::invalid_type(
                name,
                &self.raw[index],
                ArgumentKind::Player.type_name(),
            )),
            None => Err(CommandError::missing(name)),
        }
    }

    /// Start a conditional chain on whether `name` was supplied.
    pub fn if_provided(&self, name: &str) -> Conditional<'_> {
        Conditional::new(self, self.is_provided(name))
    }

    /// Start a conditional chain on whether `name` equals `expected`.
    pub fn if_equal<T: FromArgument + PartialEq>(&self, name: &str, expected: &T) -> Conditional<'_> {
        Conditional::new(self, self.is_equal(name, expected))
    }

    /// Start a conditional chain on a plain condition.
    pub fn if_true(&self, condition: bool) -> Conditional<'_> {
        Conditional::new(self, condition)
    }
}

fn convert(spec: &ArgumentSpec, token: &str) -> Result<ArgValue> {
    let invalid = || CommandError::invalid_type(&spec.label, token, spec.kind.type_name());

    match &spec.kind {
        ArgumentKind::Bool => {
            if token.eq_ignore_ascii_case("true") {
                Ok(ArgValue::Bool(true))
            } else if token.eq_ignore_ascii_case("false") {
                Ok(ArgValue::Bool(false))
            } else {
                Err(invalid())
            }
        }
        ArgumentKind::Integer { min, max } => {
            let n: i32 = token.parse().map_err(|_| invalid())?;
            within(n, *min, *max).then_some(ArgValue::Int(n)).ok_or_else(invalid)
        }
        ArgumentKind::Long { min, max } => {
            let n: i64 = token.parse().map_err(|_| invalid())?;
            within(n, *min, *max).then_some(ArgValue::Long(n)).ok_or_else(invalid)
        }
        ArgumentKind::Float { min, max } => {
            let n: f32 = token.parse().map_err(|_| invalid())?;
            (n.is_finite() && within(n, *min, *max))
                .then_some(ArgValue::Float(n))
                .ok_or_else(invalid)
        }
        ArgumentKind::Double { min, max } => {
            let n: f64 = token.parse().map_err(|_| invalid())?;
            (n.is_finite() && within(n, *min, *max))
                .then_some(ArgValue::Double(n))
                .ok_or_else(invalid)
        }
        ArgumentKind::Word => {
            if token.is_empty() || token.contains(char::is_whitespace) {
                Err(invalid())
            } else {
                Ok(ArgValue::Text(token.to_string()))
            }
        }
        ArgumentKind::String | ArgumentKind::Greedy => Ok(ArgValue::Text(token.to_string())),
        ArgumentKind::Player | ArgumentKind::Players => {
            if token.is_empty() {
                Err(invalid())
            } else {
                Ok(ArgValue::Selector(token.to_string()))
            }
        }
        ArgumentKind::Material | ArgumentKind::Item => {
            let id = token.to_ascii_lowercase();
            if is_resource_id(&id) {
                Ok(ArgValue::Resource(id))
            } else {
                Err(invalid())
            }
        }
    }
}

fn within<T: PartialOrd>(n: T, min: Option<T>, max: Option<T>) -> bool {
    min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn tokens(input: &str) -> Vec<String> {
        input.split_whitespace().map(String::from).collect()
    }

    fn int(label: &str) -> ArgumentSpec {
        ArgumentSpec::new(
            label,
            ArgumentKind::Integer {
                min: None,
                max: None,
            },
        )
    }

    fn optional(mut spec: ArgumentSpec) -> ArgumentSpec {
        spec.required = false;
        spec
    }

    #[test]
    fn test_parse_positional() {
        let specs = vec![int("x"), optional(ArgumentSpec::new("y", ArgumentKind::Word))];

        let args = Arguments::parse(&specs, &tokens("5 hello")).unwrap();
        assert_eq!(args.get::<i32>("x").unwrap(), 5);
        assert_eq!(args.get::<String>("y").unwrap(), "hello");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_missing_required() {
        let specs = vec![int("x"), optional(ArgumentSpec::new("y", ArgumentKind::Word))];

        let err = Arguments::parse(&specs, &[]).unwrap_err();
        assert_eq!(err, CommandError::missing("x"));
    }

    #[test]
    fn test_missing_optional_uses_default() {
        let specs = vec![int("x"), optional(ArgumentSpec::new("y", ArgumentKind::Word))];

        let args = Arguments::parse(&specs, &tokens("1")).unwrap();
        assert!(args.is_provided("x"));
        assert!(!args.is_provided("y"));
        assert_eq!(args.get_or("y", "fallback".to_string()), "fallback");
        assert_eq!(args.get::<String>("y").unwrap_err(), CommandError::missing("y"));
    }

    #[test]
    fn test_invalid_type() {
        let specs = vec![int("x")];
        let err = Arguments::parse(&specs, &tokens("abc")).unwrap_err();
        assert_matches!(err, CommandError::InvalidArgumentType { label, input, .. } => {
            assert_eq!(label, "x");
            assert_eq!(input, "abc");
        });
    }

    #[test]
    fn test_conversion_failure_before_missing() {
        let specs = vec![int("x"), int("y")];
        let err = Arguments::parse(&specs, &tokens("nope")).unwrap_err();
        assert_eq!(err.argument_label(), Some("x"));
    }

    #[test]
    fn test_range_checks() {
        let specs = vec![ArgumentSpec::new(
            "amount",
            ArgumentKind::Integer {
                min: Some(1),
                max: Some(64),
            },
        )];

        assert!(Arguments::parse(&specs, &tokens("64")).is_ok());
        assert!(Arguments::parse(&specs, &tokens("0")).is_err());
        assert!(Arguments::parse(&specs, &tokens("65")).is_err());

        let specs = vec![ArgumentSpec::new(
            "speed",
            ArgumentKind::Double {
                min: Some(0.0),
                max: None,
            },
        )];
        assert!(Arguments::parse(&specs, &tokens("0.5")).is_ok());
        assert!(Arguments::parse(&specs, &tokens("-0.5")).is_err());
        assert!(Arguments::parse(&specs, &tokens("NaN")).is_err());
    }

    #[test]
    fn test_greedy_takes_rest() {
        let specs = vec![
            ArgumentSpec::new("target", ArgumentKind::Player),
            ArgumentSpec::new("message", ArgumentKind::Greedy),
        ];

        let args = Arguments::parse(&specs, &tokens("Steve hello there  world")).unwrap();
        assert_eq!(args.get::<String>("message").unwrap(), "hello there world");
        assert_eq!(args.raw("target"), Some("Steve"));
    }

    #[test]
    fn test_too_many_arguments() {
        let specs = vec![int("x")];
        let err = Arguments::parse(&specs, &tokens("1 2 3")).unwrap_err();
        assert_eq!(
            err,
            CommandError::TooManyArguments {
                input: "2 3".to_string()
            }
        );
    }

    #[test]
    fn test_bool_and_widening() {
        let specs = vec![ArgumentSpec::new("flag", ArgumentKind::Bool), int("n")];
        let args = Arguments::parse(&specs, &tokens("TRUE 7")).unwrap();

        assert!(args.get::<bool>("flag").unwrap());
        assert_eq!(args.get::<i64>("n").unwrap(), 7);
        assert_matches!(
            args.get::<bool>("n"),
            Err(CommandError::InvalidArgumentType { .. })
        );
    }

    #[test]
    fn test_material_is_lowercased() {
        let specs = vec![ArgumentSpec::new("block", ArgumentKind::Material)];
        let args = Arguments::parse(&specs, &tokens("Minecraft:Stone")).unwrap();
        assert_eq!(args.get::<String>("block").unwrap(), "minecraft:stone");

        assert!(Arguments::parse(&specs, &tokens("not!valid")).is_err());
    }

    #[test]
    fn test_is_equal() {
        let specs = vec![ArgumentSpec::new("mode", ArgumentKind::Word), int("n")];
        let args = Arguments::parse(&specs, &tokens("add 3")).unwrap();

        assert!(args.is_equal("mode", &"add".to_string()));
        assert!(!args.is_equal("mode", &"remove".to_string()));
        assert!(args.is_equal("n", &3));
        assert!(!args.is_equal("missing", &3));
    }

    #[test]
    fn test_selector_access() {
        let specs = vec![ArgumentSpec::new("target", ArgumentKind::Player), int("n")];
        let args = Arguments::parse(&specs, &tokens("@p 2")).unwrap();

        assert_eq!(args.selector("target").unwrap(), "@p");
        assert_matches!(
            args.selector("n"),
            Err(CommandError::InvalidArgumentType { .. })
        );
        assert_eq!(args.selector("other").unwrap_err(), CommandError::missing("other"));
    }

    #[test]
    fn test_optional_before_required_is_positional() {
        let specs = vec![optional(int("page")), ArgumentSpec::new("name", ArgumentKind::Word)];

        let err = Arguments::parse(&specs, &[]).unwrap_err();
        assert_eq!(err, CommandError::missing("name"));

        let err = Arguments::parse(&specs, &tokens("steve")).unwrap_err();
        assert_eq!(err.argument_label(), Some("page"));
    }
}
