use anyhow::Result;
use cliclack::spinner;
use console::style;

use crate::profile::{
    find_existing_profile, profile_path, recommended_model, save_profile, select_provider_lists,
    set_provider_config, Profile,
};
use tandem::models::message::Message;
use tandem::providers::factory::get_provider;

pub async fn handle_configure(provided_profile_name: Option<String>) -> Result<()> {
    cliclack::intro(style(" configure-tandem ").on_cyan().black())?;

    let profile_name = if let Some(name) = provided_profile_name {
        name
    } else {
        cliclack::input("Which profile would you like to configure?")
            .default_input("default")
            .interact()?
    };

    // Prior settings seed the defaults when the profile already exists
    let existing_profile = find_existing_profile(&profile_name);

    if existing_profile.is_some() {
        let _ = cliclack::log::info(format!(
            "Updating the existing profile {}",
            profile_name
        ));
    }

    let default_provider = existing_profile
        .as_ref()
        .map_or("openai", |profile| profile.provider.as_str());
    let provider_name = cliclack::select("Which provider should power this profile?")
        .initial_value(default_provider)
        .items(&select_provider_lists())
        .interact()?
        .to_string();

    let default_model = existing_profile
        .as_ref()
        .map_or(recommended_model(&provider_name), |profile| {
            profile.model.as_str()
        });
    let model: String = cliclack::input("Which model from that provider?")
        .default_input(default_model)
        .interact()?;

    let profile = Profile {
        provider: provider_name.clone(),
        model: model.clone(),
    };

    // One live completion proves the credentials and model name actually work
    let provider_config = set_provider_config(&provider_name, model)?;
    let spin = spinner();
    spin.start("Testing the connection to your provider...");
    let provider = get_provider(provider_config)?;
    let message = Message::user().with_text(
        "Greet the user in one short sentence and confirm their setup is ready to use",
    );
    let result = provider
        .complete(
            "You are Tandem, an agent that drives the tools of connected systems to get work done.",
            &[message],
            &[],
        )
        .await;

    match result {
        Ok((message, _usage)) => {
            let text = message.text();
            if text.is_empty() {
                spin.stop("The model sent no text back");
            } else {
                spin.stop(text);
            }

            let _ = match save_profile(&profile_name, profile) {
                Ok(()) => cliclack::outro(format!("Saved your profile to {:?}", profile_path()?)),
                Err(e) => cliclack::outro(format!("Could not save the profile: {}", e)),
            };
        }
        Err(_) => {
            spin.stop("That configuration didn't connect!");
            let _ = cliclack::outro("Check your credentials and run configure again.");
        }
    }

    Ok(())
}
