/// Result of a best-effort collaborator call.
///
/// Speech, retrieval, webhooks and call logging may fail without failing the
/// request. They return `Outcome` instead of `Result` so a caller cannot `?`
/// a soft failure into a hard one by accident.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Outcome<T> {
    Ready(T),
    Degraded { reason: String },
}

impl<T> Outcome<T> {
    pub fn degraded(reason: impl Into<String>) -> Self {
        Outcome::Degraded {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(v) => Some(v),
            Outcome::Degraded { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ready(v) => Outcome::Ready(f(v)),
            Outcome::Degraded { reason } => Outcome::Degraded { reason },
        }
    }

    /// Fold a fallible call into an outcome, keeping the error text as the reason.
    pub fn from_result<E: std::fmt::Display>(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(v) => Outcome::Ready(v),
            Err(e) => Outcome::degraded(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_and_degraded() {
        let ok: Outcome<u8> = Outcome::Ready(3);
        assert!(ok.is_ready());
        assert_eq!(ok.map(|v| v * 2).ready(), Some(6));

        let bad: Outcome<u8> = Outcome::degraded("tts offline");
        assert!(!bad.is_ready());
        assert_eq!(bad.clone().ready(), None);
        assert_eq!(
            bad,
            Outcome::Degraded {
                reason: "tts offline".into()
            }
        );
    }

    #[test]
    fn test_from_result() {
        let r: std::result::Result<u8, String> = Err("boom".into());
        assert_eq!(Outcome::from_result(r), Outcome::degraded("boom"));
    }
}
