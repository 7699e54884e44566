use anyhow::Result;
use tandem::models::message::Message;

pub mod rustyline;
pub mod thinking;

/// Terminal front-end a session drives.
///
/// Implementations own message rendering and input collection, keeping
/// the session loop free of terminal details.
pub trait Prompt {
    fn render(&mut self, message: Box<Message>);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&self);
    fn close(&self);
    fn ready(&self) {
        println!("\n");
        println!("Tandem is ready! Type an instruction, or ask what tandem can help with.");
        println!("\n");
    }
}

/// One round of user input, either text for the agent or a control command
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Empty for commands such as Exit
}

impl Input {
    pub fn message(content: impl Into<String>) -> Self {
        Input {
            input_type: InputType::Message,
            content: Some(content.into()),
        }
    }

    pub fn ask_again() -> Self {
        Input {
            input_type: InputType::AskAgain,
            content: None,
        }
    }

    pub fn exit() -> Self {
        Input {
            input_type: InputType::Exit,
            content: None,
        }
    }
}

pub enum InputType {
    AskAgain, // Re-prompt without sending anything
    Message,  // Text to hand to the agent
    Exit,     // Leave the session
}

pub enum Theme {
    Light,
    Dark,
}
