use crate::form::{PhoneForm, PHONE_MASK, SENT_DIALOG_TIMEOUT};
use tera::{Context, Tera};

const INDEX: &str = "index.html";

/// Renders the form page. Templates are compiled once and autoescaped.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(INDEX, include_str!("../templates/index.html"))?;
        Ok(Self { tera })
    }

    pub fn render(&self, form: &PhoneForm) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("mask", PHONE_MASK);
        ctx.insert("phone_number", form.phone_number());
        ctx.insert("confirm_open", &form.confirm_open());
        ctx.insert("confirm_title", &form.confirm_title());
        ctx.insert("sent_open", &form.sent_open());
        ctx.insert("sent_title", &form.sent_title().unwrap_or_default());
        ctx.insert("sent_timeout_secs", &SENT_DIALOG_TIMEOUT.as_secs());
        self.tera.render(INDEX, &ctx)
    }
}
