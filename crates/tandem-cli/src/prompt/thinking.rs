use rand::seq::SliceRandom;

const THINKING_MESSAGES: &[&str] = &[
    "Thinking it through",
    "Consulting the panel",
    "Weighing the options",
    "Lining up the tools",
    "Reading between the lines",
    "Connecting the dots",
    "Checking the numbers",
    "Drafting a reply",
    "Counting on it",
    "Crunching away",
    "Following the thread",
    "Sorting things out",
    "Working the problem",
    "Turning it over",
    "Putting the pieces together",
];

/// Returns a random thinking message from the predefined list
pub fn get_random_thinking_message() -> &'static str {
    THINKING_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Thinking")
}
