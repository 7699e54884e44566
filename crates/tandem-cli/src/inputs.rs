use cliclack::{input, password};

/// Read a value from the environment, prompting for it when unset.
/// Prompted values are exported so later lookups in the same run find them.
pub fn env_or_prompt(env_name: &str, prompt: &str, secret: bool) -> String {
    match std::env::var(env_name) {
        Ok(value) => value,
        Err(_) => {
            let value = if secret {
                password(prompt).mask('▪').interact().unwrap()
            } else {
                input(prompt).interact().unwrap()
            };
            std::env::set_var(env_name, &value);
            value
        }
    }
}

/// Prompt until the user enters something non-empty
pub fn required_input(message: &str, empty_error: &str) -> std::io::Result<String> {
    let empty_error = empty_error.to_string();
    input(message)
        .required(false)
        .validate(move |value: &String| {
            if value.trim().is_empty() {
                Err(empty_error.clone())
            } else {
                Ok(())
            }
        })
        .interact()
}
