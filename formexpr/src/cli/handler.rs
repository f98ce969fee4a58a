//! Command handlers

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;

use formexpr::{Engine, EngineConfig, Map, Part, TemplateExpression, Value};

/// Build the engine from an explicit config file, or the default one if present
pub fn build_engine(config_path: Option<&Path>) -> Result<Engine> {
    let config = match config_path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => EngineConfig::load_default().context("Failed to load default config")?,
    };
    Ok(Engine::with_config(config))
}

/// Read a JSON object from disk as an evaluation context
fn read_context(path: &Path) -> Result<Map> {
    if !path.exists() {
        anyhow::bail!("Context file does not exist: {}", path.display());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file: {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Context file is not valid JSON: {}", path.display()))?;

    match Value::from(json) {
        Value::Map(map) => Ok(map),
        other => anyhow::bail!(
            "Context file must contain a JSON object, found {}: {}",
            other.type_name(),
            path.display()
        ),
    }
}

/// Parse `key=value`; the value is read as JSON when possible, else as a string
fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    let Some((key, raw)) = assignment.split_once('=') else {
        anyhow::bail!("Expected KEY=VALUE, got '{}'", assignment);
    };
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Missing key in '{}'", assignment);
    }
    let value = serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw));
    Ok((key.to_string(), value))
}

pub fn handle_eval(
    engine: &Engine,
    template: &str,
    context_file: Option<&Path>,
    assignments: &[String],
    json: bool,
) -> Result<()> {
    let mut context = match context_file {
        Some(path) => read_context(path)?,
        None => Map::new(),
    };
    for assignment in assignments {
        let (key, value) = parse_assignment(assignment)?;
        context.insert(key, value);
    }
    log::debug!("Evaluating with {} context values", context.len());

    let value = engine.evaluate_expression(template, &context)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&value.to_json()).context("Failed to serialize result")?;
        println!("{}", rendered);
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn part_kind(part: &Part) -> &'static str {
    match part {
        Part::Text(_) => "text",
        Part::Literal(_) => "literal",
        Part::Variable { .. } => "variable",
        Part::Function { .. } => "call",
        Part::NullCoalesce { .. } => "coalesce",
        Part::ForEach { .. } => "forEach",
    }
}

pub fn handle_check(engine: &Engine, template: &str) -> Result<()> {
    let parsed = engine.parse(template)?;

    println!("{} {}", "✓".bright_green(), "Template is valid".bold());
    println!();

    println!("{}", "Parts:".bold());
    if parsed.parts.is_empty() {
        println!("  {}", "(empty)".dimmed());
    }
    for (i, part) in parsed.parts.iter().enumerate() {
        let shown = match part {
            Part::Text(s) => format!("{:?}", s),
            other => other.to_string(),
        };
        println!("  {:>2}. {:<9} {}", i, part_kind(part).cyan(), shown);
    }

    if parsed.is_text_only() {
        println!();
        println!("{}", "No expressions; the text is rendered verbatim".dimmed());
        return Ok(());
    }

    println!();
    println!("{}", "Variables:".bold());
    let paths = parsed.variable_paths();
    if paths.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for path in paths {
        println!("  {}", path);
    }

    let roots = root_sources(engine, &parsed);
    if !roots.is_empty() {
        println!();
        println!("{}", "Roots:".bold());
    }
    for (root, registered) in roots {
        let marker = if registered { "registered".green() } else { "context".yellow() };
        println!("  {} {}", root, format!("({})", marker).dimmed());
    }
    Ok(())
}

/// Root variables of a template, flagged by whether the registry provides them
fn root_sources<'a>(engine: &Engine, template: &'a TemplateExpression) -> Vec<(&'a str, bool)> {
    template
        .root_variables()
        .into_iter()
        .map(|root| (root, engine.registry().variable(root).is_some()))
        .collect()
}

pub fn handle_suggest(
    engine: &Engine,
    partial: &str,
    context_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    if let Some(path) = context_file {
        for (name, value) in read_context(path)? {
            engine.register_variable(name, value);
        }
    }

    let suggestions = engine.get_expression_suggestions(partial);

    if json {
        let rendered =
            serde_json::to_string_pretty(&suggestions).context("Failed to serialize suggestions")?;
        println!("{}", rendered);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("{}", "No suggestions".dimmed());
        return Ok(());
    }

    for suggestion in &suggestions {
        let detail = match &suggestion.signature {
            Some(signature) => signature.clone(),
            None => suggestion.sample_value.to_json().to_string(),
        };
        println!(
            "  {:<32} {:<9} {}",
            suggestion.expr.bright_white().bold(),
            suggestion.value_type.cyan(),
            detail.dimmed()
        );
    }
    println!();
    println!("{} suggestion(s)", suggestions.len().to_string().bright_green());
    Ok(())
}

pub fn handle_functions(engine: &Engine) -> Result<()> {
    let functions = engine.registry().functions_info();
    if functions.is_empty() {
        println!("{}", "No functions registered".dimmed());
        return Ok(());
    }

    for info in &functions {
        println!("  {:<36} {}", info.signature.cyan(), info.description.dimmed());
    }
    println!();
    println!("{} function(s)", functions.len().to_string().bright_green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("age=30").unwrap(),
            ("age".to_string(), Value::from(30))
        );
        assert_eq!(
            parse_assignment("name=Jane Doe").unwrap(),
            ("name".to_string(), Value::from("Jane Doe"))
        );
        assert_eq!(
            parse_assignment("tags=[\"a\"]").unwrap(),
            ("tags".to_string(), Value::List(vec![Value::from("a")]))
        );
        assert_eq!(
            parse_assignment("expr=a=b").unwrap(),
            ("expr".to_string(), Value::from("a=b"))
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn test_root_sources() {
        let engine = Engine::bare();
        engine.register_variable("order", serde_json::json!({"items": []}));

        let parsed = engine
            .parse("${forEach(item, order.items, concat(item.name, currency))} ${order.id}")
            .unwrap();
        assert!(!parsed.is_text_only());
        assert_eq!(root_sources(&engine, &parsed), vec![("order", true), ("currency", false)]);

        let plain = engine.parse("no placeholders").unwrap();
        assert!(plain.is_text_only());
        assert_eq!(*plain, TemplateExpression::text("no placeholders"));
        assert!(root_sources(&engine, &plain).is_empty());
    }

    #[test]
    fn test_read_context_requires_object() {
        let dir = std::env::temp_dir().join(format!("formexpr-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let object = dir.join("object.json");
        fs::write(&object, r#"{"name": "Ada", "age": 36}"#).unwrap();
        let context = read_context(&object).unwrap();
        assert_eq!(context["name"], Value::from("Ada"));

        let array = dir.join("array.json");
        fs::write(&array, "[1, 2]").unwrap();
        assert!(read_context(&array).is_err());

        assert!(read_context(&dir.join("missing.json")).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
