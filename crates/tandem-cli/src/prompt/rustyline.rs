use std::{
    collections::HashMap,
    io::{self, Write},
};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::spinner;
use console::style;
use serde_json::Value;
use tandem::models::content::Content;
use tandem::models::message::{Message, MessageContent, ToolRequest, ToolResponse};
use tandem::models::tool::ToolCall;

use super::{thinking::get_random_thinking_message, Input, Prompt, Theme};

const PROMPT: &str = "\x1b[1m\x1b[38;5;30m(tandem)> \x1b[0m";
const MAX_INLINE_STRING: usize = 40;
const INDENT_WIDTH: usize = 4;

pub struct RustylinePrompt {
    theme: Theme,
    renderers: HashMap<String, Box<dyn ToolRenderer>>,
    spinner: cliclack::ProgressBar,
}

impl RustylinePrompt {
    pub fn new() -> Self {
        let mut renderers: HashMap<String, Box<dyn ToolRenderer>> = HashMap::new();
        let all: Vec<Box<dyn ToolRenderer>> =
            vec![Box::new(DefaultRenderer), Box::new(CalculateRenderer)];
        for renderer in all {
            renderers.insert(renderer.tool_name().to_string(), renderer);
        }

        RustylinePrompt {
            theme: Theme::Dark,
            renderers,
            spinner: spinner(),
        }
    }

    fn renderer_for(&self, tool_name: &str) -> &dyn ToolRenderer {
        self.renderers
            .get(tool_name)
            .or_else(|| self.renderers.get("default"))
            .unwrap()
            .as_ref()
    }
}

impl Default for RustylinePrompt {
    fn default() -> Self {
        Self::new()
    }
}

/// Tools can ship their own terminal rendering by implementing ToolRenderer
/// and registering it under their prefixed name.
trait ToolRenderer {
    fn tool_name(&self) -> &'static str;
    fn request(&self, request: &ToolRequest, theme: &str);
    fn response(&self, response: &ToolResponse, theme: &str);
}

struct DefaultRenderer;

impl ToolRenderer for DefaultRenderer {
    fn tool_name(&self) -> &'static str {
        "default"
    }

    fn request(&self, request: &ToolRequest, theme: &str) {
        match &request.tool_call {
            Ok(call) => {
                print_request_header(call);
                print_params(&call.arguments, 0);
                println!();
            }
            Err(e) => print_markdown(&e.to_string(), theme),
        }
    }

    fn response(&self, response: &ToolResponse, theme: &str) {
        print_tool_result(response, theme);
    }
}

struct CalculateRenderer;

impl ToolRenderer for CalculateRenderer {
    fn tool_name(&self) -> &'static str {
        "utility__calculate"
    }

    fn request(&self, request: &ToolRequest, theme: &str) {
        match &request.tool_call {
            Ok(call) => {
                print_request_header(call);

                match (
                    call.arguments.get("operation"),
                    call.arguments.get("x"),
                    call.arguments.get("y"),
                ) {
                    (Some(Value::String(op)), Some(x), Some(y)) => {
                        println!(
                            "{}: {} {} {}",
                            style("compute").dim(),
                            style(x).blue(),
                            style(op).green(),
                            style(y).blue()
                        );
                    }
                    _ => print_params(&call.arguments, 0),
                }
                println!();
            }
            Err(e) => print_markdown(&e.to_string(), theme),
        }
    }

    fn response(&self, response: &ToolResponse, theme: &str) {
        print_tool_result(response, theme);
    }
}

fn print_tool_result(response: &ToolResponse, theme: &str) {
    match &response.tool_result {
        Ok(contents) => {
            for content in contents {
                if let Content::Text(text) = content {
                    print_markdown(&text.text, theme);
                }
            }
        }
        Err(e) => print_markdown(&e.to_string(), theme),
    }
}

fn print_request_header(call: &ToolCall) {
    let mut parts = call.name.split("__");
    let system = parts.next().unwrap_or("unknown");
    let tool = parts.next().unwrap_or("unknown");

    println!();
    println!(
        "─── {} | {} ────────────────────",
        style(tool),
        style(system).magenta().dim(),
    );
}

fn print_markdown(markdown: &str, theme: &str) {
    bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(markdown.as_bytes()))
        .language("Markdown")
        .theme(theme)
        .wrapping_mode(WrappingMode::Character)
        .print()
        .expect("unable to print markdown");
}

/// Pretty print tool arguments with indentation, truncating long strings
fn print_params(params: &Value, depth: usize) {
    let indent = " ".repeat(INDENT_WIDTH * depth);

    match params {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) | Value::Array(_) => {
                        println!("{}{}:", indent, style(key).dim());
                        print_params(val, depth + 1);
                    }
                    _ => {
                        println!("{}{}: {}", indent, style(key).dim(), styled_scalar(val));
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                println!("{}-", indent);
                print_params(item, depth + 1);
            }
        }
        _ => {
            println!("{}{}", indent, styled_scalar(params));
        }
    }
}

fn styled_scalar(value: &Value) -> String {
    match value {
        Value::String(s) if s.len() > MAX_INLINE_STRING => {
            style(format!("[{} chars]", s.len())).yellow().to_string()
        }
        Value::String(s) => style(s).green().to_string(),
        Value::Number(n) => style(n).blue().to_string(),
        Value::Bool(b) => style(b).blue().to_string(),
        Value::Null => style("null").dim().to_string(),
        _ => String::new(),
    }
}

/// The bat syntax theme backing each of our display themes
fn bat_theme(theme: &Theme) -> &'static str {
    match theme {
        Theme::Light => "GitHub",
        Theme::Dark => "zenburn",
    }
}

impl Prompt for RustylinePrompt {
    fn render(&mut self, message: Box<Message>) {
        let theme = bat_theme(&self.theme);

        let mut last_tool_name = "default";
        for message_content in &message.content {
            match message_content {
                MessageContent::Text(text) => print_markdown(&text.text, theme),
                MessageContent::ToolRequest(tool_request) => {
                    if let Ok(call) = &tool_request.tool_call {
                        last_tool_name = &call.name;
                    }
                    self.renderer_for(last_tool_name).request(tool_request, theme);
                }
                MessageContent::ToolResponse(tool_response) => {
                    self.renderer_for(last_tool_name)
                        .response(tool_response, theme);
                }
            }
        }

        println!();
        let _ = io::stdout().flush();
    }

    fn show_busy(&mut self) {
        let spinner = spinner();
        spinner.start(format!("{}...", get_random_thinking_message()));
        self.spinner = spinner;
    }

    fn hide_busy(&self) {
        self.spinner.stop("");
    }

    fn get_input(&mut self) -> Result<Input> {
        let mut editor = rustyline::DefaultEditor::new()?;
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => return Ok(Input::exit()),
            Err(e) => {
                eprintln!("Could not read input: {}", e);
                return Ok(Input::exit());
            }
        };

        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "/exit" | "/quit" => Ok(Input::exit()),
            "/t" => {
                self.theme = match self.theme {
                    Theme::Light => {
                        println!("Dark theme on");
                        Theme::Dark
                    }
                    Theme::Dark => {
                        println!("Light theme on");
                        Theme::Light
                    }
                };
                Ok(Input::ask_again())
            }
            "/?" | "/help" => {
                println!("Commands:");
                println!("/exit, /quit - Leave the session");
                println!("/t - Switch between the light and dark themes");
                println!("/?, /help - Show this message");
                println!("Ctrl+C - Interrupt tandem and rewind to before your last message");
                Ok(Input::ask_again())
            }
            _ => Ok(Input::message(trimmed)),
        }
    }

    fn close(&self) {
        // Nothing to tear down
    }
}
