//! Commands of the demo interpreter.

use std::fmt;

use anyhow::{ensure, Result};
use typeshell_core::{
    ArgType, Command, CommandRegistry, ConstructError, CustomType, CustomValue, DefinitionError,
    EnumType, HexBytes, Parameter, Primitive, Suggestion, TypeDescriptor, Value, ValueError,
};
use typeshell_macros::command;

/// Adds two numbers.
///
/// Integers may be written in hex (0x), octal (0o) or binary (0b).
#[command]
pub fn sum(first: i64, #[default(0)] second: i64) -> i64 {
    first + second
}

/// Switches the led on or off.
#[command]
pub fn led(on: bool) -> String {
    format!("led | {}", if on { "ON" } else { "OFF" })
}

/// Sends hex encoded bytes over a port.
#[command]
pub fn send(port: String, data: HexBytes, #[default(115_200)] baud: u32) -> String {
    format!("send | port: {port} baudrate: {baud}, data: {:02X?}", data.0)
}

/// Mean and spread of a list of samples.
#[command]
pub fn stats(samples: Vec<f64>) -> Result<String> {
    ensure!(!samples.is_empty(), "stats needs at least one sample");
    let count = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / count;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / count;
    Ok(format!("mean {mean:.3}, stddev {:.3}", variance.sqrt()))
}

/// Moves a point by each of the given steps.
#[command]
pub fn walk(start: (f64, f64), steps: Vec<(f64, f64)>) -> (f64, f64) {
    steps
        .iter()
        .fold(start, |(x, y), (dx, dy)| (x + dx, y + dy))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl ArgType for Level {
    fn descriptor() -> TypeDescriptor {
        EnumType::new("Level")
            .member("error", "only failures")
            .member("warn", "failures and oddities")
            .member("info", "progress")
            .member("debug", "everything")
            .into()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match &value {
            Value::Enum(name) if name == "error" => Ok(Level::Error),
            Value::Enum(name) if name == "warn" => Ok(Level::Warn),
            Value::Enum(name) if name == "info" => Ok(Level::Info),
            Value::Enum(name) if name == "debug" => Ok(Level::Debug),
            other => Err(ValueError::Mismatch {
                expected: "Level".to_string(),
                found: other.kind().to_string(),
            }),
        }
    }
}

/// Changes the log level of the interpreter.
#[command]
pub fn verbosity(level: Level) -> String {
    let filter = match level {
        Level::Error => log::LevelFilter::Error,
        Level::Warn => log::LevelFilter::Warn,
        Level::Info => log::LevelFilter::Info,
        Level::Debug => log::LevelFilter::Debug,
    };
    log::set_max_level(filter);
    format!("log level set to {filter}")
}

/// An RGB color, written by name or as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(u8, u8, u8);

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color(0, 0, 0)),
    ("blue", Color(0, 0, 255)),
    ("green", Color(0, 128, 0)),
    ("grey", Color(128, 128, 128)),
    ("red", Color(255, 0, 0)),
    ("white", Color(255, 255, 255)),
];

struct ColorType;

impl ColorType {
    fn parse_rgb(text: &str) -> Option<Color> {
        let hex = text.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).ok();
        Some(Color(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl CustomType for ColorType {
    fn name(&self) -> &str {
        "Color"
    }

    fn parse(&self, text: &str) -> Result<Value, ConstructError> {
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == text)
            .map(|(_, color)| *color)
            .or_else(|| Self::parse_rgb(text))
            .map(|color| Value::Custom(CustomValue::new(color)))
            .ok_or_else(|| ConstructError::invalid("Color", text, "expected a color name or #rrggbb"))
    }

    fn complete(&self, text: &str) -> Vec<Suggestion> {
        NAMED_COLORS
            .iter()
            .filter(|(name, _)| name.starts_with(text))
            .map(|(name, _)| Suggestion::from(*name))
            .collect()
    }
}

impl ArgType for Color {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::custom(ColorType)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match &value {
            Value::Custom(custom) => custom.downcast_ref::<Color>().copied(),
            _ => None,
        }
        .ok_or_else(|| ValueError::Mismatch {
            expected: "Color".to_string(),
            found: value.kind().to_string(),
        })
    }
}

/// Mixes two colors.
///
/// `weight` is the share of the second color, from 0 to 1.
#[command]
pub fn mix(first: Color, second: Color, #[default(0.5)] weight: f64) -> Result<String> {
    ensure!((0.0..=1.0).contains(&weight), "weight must be between 0 and 1");
    let blend = |a: u8, b: u8| (f64::from(a) * (1.0 - weight) + f64::from(b) * weight).round() as u8;
    Ok(Color(blend(first.0, second.0), blend(first.1, second.1), blend(first.2, second.2)).to_string())
}

/// Reports whether the value was read as a number or as a word.
fn describe() -> Command {
    Command::new("describe", |args| {
        let text = match args.value("value") {
            Some(Value::Float(number)) => format!("number {number}"),
            Some(other) => format!("word {other}"),
            None => "nothing".to_string(),
        };
        Ok(Value::Str(text))
    })
    .param(Parameter::new(
        "value",
        TypeDescriptor::Union(vec![Primitive::F64.into(), Primitive::Str.into()]),
    ))
    .with_description("Reports whether the value was read as a number or as a word.")
}

pub fn registry() -> Result<CommandRegistry, DefinitionError> {
    CommandRegistry::builder()
        .register(sum_command())
        .register(led_command())
        .register(send_command())
        .register(stats_command())
        .register(walk_command())
        .register(verbosity_command())
        .register(mix_command())
        .register(describe())
        .build()
}

#[cfg(test)]
mod tests {
    use typeshell_core::{CommandLine, Invoker};

    use super::*;

    fn run(line: &str) -> Value {
        let registry = registry().unwrap();
        Invoker::new(&registry)
            .invoke(&CommandLine::parse(line).unwrap())
            .unwrap()
    }

    #[test]
    fn test_demo_commands() {
        assert_eq!(run("sum 0x10 0b1"), Value::Int(17));
        assert_eq!(run("led 0"), Value::Str("led | OFF".into()));
        assert_eq!(
            run("send COM1 A0FF"),
            Value::Str("send | port: COM1 baudrate: 115200, data: [A0, FF]".into())
        );
        assert_eq!(run("walk (0,0) [(1,2),(3,4)]"), Value::Tuple(vec![Value::Float(4.0), Value::Float(6.0)]));
        assert_eq!(run("describe 2.5"), Value::Str("number 2.5".into()));
        assert_eq!(run("describe abc"), Value::Str("word abc".into()));
    }

    #[test]
    fn test_color_type() {
        assert_eq!(run("mix black white"), Value::Str("#808080".into()));
        assert_eq!(run("mix red #0000ff weight=1"), Value::Str("#0000ff".into()));
        let completions: Vec<Suggestion> = ColorType.complete("gr");
        assert_eq!(completions, vec![Suggestion::from("green"), Suggestion::from("grey")]);
    }
}
