//! The single HTML page: prediction form plus optional result block.

use crate::outcome::Outcome;
use minijinja::{Environment, context};

const TEMPLATE_NAME: &str = "index.html";

/// Compiled page template, shared by all requests.
pub struct Page {
    env: Environment<'static>,
}

impl Page {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, include_str!("../templates/index.html"))?;
        Ok(Self { env })
    }

    /// Render the form; the result block appears only when `outcome` is set.
    pub fn render(&self, outcome: Option<&Outcome>) -> Result<String, minijinja::Error> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        match outcome {
            Some(outcome) => template.render(context! {
                prediction_text => outcome.text,
                result_class => outcome.style.css_class(),
                emoji => outcome.icon,
            }),
            None => template.render(context! {
                prediction_text => "",
                result_class => "",
                emoji => "",
            }),
        }
    }
}
