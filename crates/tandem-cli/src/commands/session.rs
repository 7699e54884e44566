use anyhow::Result;

use crate::profile::{load_profile_or_default, set_provider_config};
use crate::prompt::rustyline::RustylinePrompt;
use crate::session::Session;
use tandem::agent::Agent;
use tandem::approval::ApprovalOptions;
use tandem::providers::factory::get_provider;

pub fn build_session(profile_name: Option<String>, approve: bool) -> Result<Box<Session>> {
    let profile = load_profile_or_default(profile_name);
    tracing::debug!(provider = %profile.provider, model = %profile.model, "building session");

    let provider_config = set_provider_config(&profile.provider, profile.model)?;
    let provider = get_provider(provider_config)?;
    let agent = Box::new(Agent::new(provider));

    let approval = approve.then(ApprovalOptions::permissive);
    let prompt = Box::new(RustylinePrompt::new());

    Ok(Box::new(Session::new(agent, prompt, approval)))
}
