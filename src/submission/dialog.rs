use serde::Serialize;

/// Signup dialog: visibility, typed email, and whether a submit is running.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignupDialog {
    open: bool,
    email: String,
    submitting: bool,
}

impl SignupDialog {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close without submitting. The typed email is kept.
    pub fn skip(&mut self) {
        self.open = false;
    }

    /// Input is locked while a submit runs.
    pub fn set_email(&mut self, email: impl Into<String>) {
        if !self.submitting {
            self.email = email.into();
        }
    }

    /// Mark a submit as started and hand back the email to send.
    /// `None` when the dialog is closed or a submit is already running.
    pub fn begin_submit(&mut self) -> Option<String> {
        if !self.open || self.submitting {
            return None;
        }
        self.submitting = true;
        Some(self.email.clone())
    }

    /// Every submit ends here. Success closes the dialog and resets the
    /// email; failure leaves both for a retry.
    pub fn finish_submit(&mut self, success: bool) {
        self.submitting = false;
        if success {
            self.open = false;
            self.email.clear();
        }
    }
}
