//! Presenter test utilities

use std::sync::Mutex;

use update_siren::check::presenter::{Presenter, UpdatePrompt, UserChoice};

/// Presenter that answers every prompt with the same choice and keeps the prompts
pub struct ScriptedPresenter {
    choice: UserChoice,
    prompts: Mutex<Vec<UpdatePrompt>>,
}

impl ScriptedPresenter {
    pub fn new(choice: UserChoice) -> Self {
        Self {
            choice,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<UpdatePrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Presenter for ScriptedPresenter {
    fn present(&self, prompt: &UpdatePrompt) -> UserChoice {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.choice
    }
}
