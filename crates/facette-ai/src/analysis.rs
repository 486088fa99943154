use crate::client::{AiClient, AiError};
use crate::prompt::{analysis_prompt, ping_prompt, FaceAnalysisData};
use crate::response::{parse_analysis, AiAnalysis};

/// Ask the provider to classify a face. One attempt, no retry.
pub async fn analyze_face<C: AiClient>(client: &C, data: &FaceAnalysisData) -> Result<AiAnalysis, AiError> {
    let prompt = analysis_prompt(data);
    let text = client.complete(&prompt).await?;
    tracing::debug!(chars = text.len(), "AI reply received");
    parse_analysis(&text)
}

/// Round-trip a trivial prompt and check the provider answers "OK".
pub async fn test_connection<C: AiClient>(client: &C) -> bool {
    match client.complete(&ping_prompt()).await {
        Ok(text) => {
            let ok = text.contains("OK");
            tracing::info!(ok, reply = %text.trim(), "AI connection test");
            ok
        }
        Err(e) => {
            tracing::warn!(error = %e, "AI connection test failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Prompt;
    use std::sync::Mutex;

    /// Replays one canned reply and records the prompts it was given.
    struct Canned {
        reply: Result<String, AiError>,
        seen: Mutex<Vec<Prompt>>,
    }

    impl Canned {
        fn new(reply: Result<&str, AiError>) -> Self {
            Self {
                reply: reply.map(String::from),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl AiClient for Canned {
        async fn complete(&self, prompt: &Prompt) -> Result<String, AiError> {
            self.seen.lock().unwrap().push(prompt.clone());
            self.reply.clone()
        }
    }

    fn data() -> FaceAnalysisData {
        FaceAnalysisData {
            face_width: 200.0,
            face_height: 240.0,
            eye_distance: 60.0,
            mouth_width: 50.0,
            nose_height: 40.0,
            jaw_width: 110.0,
            nose_to_eye_ratio: 0.3,
            face_ratio: 1.2,
            jaw_ratio: 0.55,
            confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn test_analyze_face_parses_reply() {
        let client = Canned::new(Ok(r#"Résultat: {"estimatedAge": "18-25 ans", "confidence": 0.88}"#));
        let a = analyze_face(&client, &data()).await.unwrap();
        assert_eq!(a.estimated_age, "18-25 ans");
        assert_eq!(a.confidence, 0.88);

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].user.contains("Ratio mâchoire/largeur: 0.5500"));
    }

    #[tokio::test]
    async fn test_analyze_face_propagates_transport_error() {
        let client = Canned::new(Err(AiError::Network("connection refused".into())));
        let err = analyze_face(&client, &data()).await.unwrap_err();
        assert_eq!(err, AiError::Network("connection refused".into()));
    }

    #[tokio::test]
    async fn test_connection_checks_reply() {
        assert!(test_connection(&Canned::new(Ok("OK"))).await);
        assert!(!test_connection(&Canned::new(Ok("Bonjour"))).await);
        assert!(!test_connection(&Canned::new(Err(AiError::Timeout))).await);
    }
}
