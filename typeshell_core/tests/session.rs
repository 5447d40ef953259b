use std::fmt;
use std::rc::Rc;

use typeshell_core::{
    CommandRegistry, ConstructError, CustomType, CustomValue, EnumType, Parameter, Session,
    Suggestion, TypeDescriptor, Value,
};
use typeshell_macros::command;

#[derive(Debug, PartialEq)]
struct Color(u8, u8, u8);

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

struct ColorType;

const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color(0, 0, 0)),
    ("blue", Color(0, 0, 255)),
    ("red", Color(255, 0, 0)),
];

impl CustomType for ColorType {
    fn name(&self) -> &str {
        "Color"
    }

    fn parse(&self, text: &str) -> Result<Value, ConstructError> {
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == text)
            .map(|(_, color)| Value::Custom(CustomValue::new(Color(color.0, color.1, color.2))))
            .ok_or_else(|| ConstructError::invalid("Color", text, "unknown color"))
    }

    fn complete(&self, text: &str) -> Vec<Suggestion> {
        NAMED_COLORS
            .iter()
            .filter(|(name, _)| name.starts_with(text))
            .map(|(name, _)| Suggestion::from(*name))
            .collect()
    }
}

/// Greets someone.
#[command]
fn greet(name: String, #[default(1)] times: u8) -> String {
    vec![format!("hello {name}"); usize::from(times)].join("\n")
}

fn session() -> Session {
    let paint = typeshell_core::Command::new("paint", |args| {
        let color = args.value("color").cloned().unwrap_or(Value::Unit);
        let level: String = args.get("level")?;
        Ok(Value::Str(format!("{color} at {level}")))
    })
    .param(Parameter::new("color", TypeDescriptor::Custom(Rc::new(ColorType))))
    .param(Parameter::new(
        "level",
        EnumType::new("Level").member("low", "1").member("high", "2").into(),
    ))
    .with_description("Paints with a color.");

    let registry = CommandRegistry::builder()
        .register(greet_command())
        .register(paint)
        .build()
        .unwrap();
    Session::new(registry).unwrap()
}

#[test]
fn test_session_runs_lines() {
    let session = session();
    assert_eq!(
        session.onecmd("gr world times=2").unwrap(),
        Value::Str("hello world\nhello world".into())
    );
    assert_eq!(
        session.onecmd("paint red high").unwrap(),
        Value::Str("#ff0000 at high".into())
    );
}

#[test]
fn test_session_error_then_details() {
    let session = session();
    assert!(session.onecmd("paint purple low").is_err());
    let Value::Str(report) = session.onecmd("get_error").unwrap() else {
        panic!("get_error returns text");
    };
    assert!(report.starts_with("invalid value for argument color"), "{report}");
    assert!(report.contains("caused by:"), "{report}");
    assert_eq!(session.onecmd("get_error").unwrap(), Value::Str("no errors".into()));
}

#[test]
fn test_session_help_for_macro_command() {
    let session = session();
    assert_eq!(
        session.onecmd("help greet").unwrap(),
        Value::Str("Greets someone.\n\nARGUMENTS: greet name times?".into())
    );
}

#[test]
fn test_session_completion() {
    let session = session();
    let texts = |line: &str| -> Vec<String> {
        session
            .complete(line, line.len())
            .into_iter()
            .map(|completion| completion.text)
            .collect()
    };
    assert_eq!(texts("pa"), vec!["paint"]);
    assert_eq!(texts("ex"), vec!["exit"]);
    assert_eq!(texts("paint b"), vec!["black", "blue"]);
    assert_eq!(texts("paint red h"), vec!["high"]);
    assert!(texts("bogus ").is_empty());
}

#[test]
fn test_cmdloop_end_to_end() {
    let session = session();
    let mut out = Vec::new();
    session
        .cmdloop("greet bob\n\npaint\nexit\n".as_bytes(), &mut out)
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "> hello bob\n> > ❌ Error: missing value for argument: color (try \"get_error\" for details)\n> exiting\n"
    );
    assert!(!session.is_running());
}
