//! Ordered fallback across transcription providers.
//!
//! Tries each configured provider in order and returns the first success.
//! A provider failure is logged and the next provider gets the same
//! request; only when every provider has failed does the caller see an
//! error, and it is the last provider's error.

use async_trait::async_trait;
use call_ai::traits::transcription;
use call_ai::types::transcript::{Request, Transcript};
use call_ai::Error;
use log::*;
use std::sync::Arc;

pub struct TranscriberChain {
    transcribers: Vec<Arc<dyn transcription::Provider>>,
}

impl TranscriberChain {
    pub fn new(transcribers: Vec<Arc<dyn transcription::Provider>>) -> Self {
        TranscriberChain { transcribers }
    }

    pub fn is_empty(&self) -> bool {
        self.transcribers.is_empty()
    }
}

#[async_trait]
impl transcription::Provider for TranscriberChain {
    async fn transcribe(&self, request: Request) -> Result<Transcript, Error> {
        let mut last_error =
            Error::Configuration("No transcription provider configured".to_string());

        for transcriber in &self.transcribers {
            match transcriber.transcribe(request.clone()).await {
                Ok(transcript) => {
                    info!(
                        "Transcription succeeded via {}",
                        transcriber.provider_id()
                    );
                    return Ok(transcript);
                }
                Err(e) => {
                    warn!("Transcriber {} failed: {e}", transcriber.provider_id());
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    fn provider_id(&self) -> &str {
        "transcriber_chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::traits::transcription::MockProvider;
    use call_ai::Utterance;

    fn short_transcript() -> Transcript {
        Transcript {
            utterances: vec![Utterance {
                speaker_index: 0,
                start_seconds: 0.0,
                end_seconds: 2.0,
                text: "Hello.".to_string(),
                confidence: Some(0.9),
            }],
            text: Some("Hello.".to_string()),
            language_code: None,
        }
    }

    #[tokio::test]
    async fn falls_back_to_the_next_provider_on_failure() {
        let mut first = MockProvider::new();
        first
            .expect_transcribe()
            .times(1)
            .returning(|_| Err(Error::Provider("upstream outage".to_string())));
        first
            .expect_provider_id()
            .return_const("assemblyai".to_owned());

        let mut second = MockProvider::new();
        second
            .expect_transcribe()
            .times(1)
            .returning(|_| Ok(short_transcript()));
        second.expect_provider_id().return_const("deepgram".to_owned());

        let chain = TranscriberChain::new(vec![Arc::new(first), Arc::new(second)]);
        let transcript = chain
            .transcribe(Request::new("https://media.example.com/call.mp3"))
            .await
            .unwrap();

        assert_eq!(transcript.utterances.len(), 1);
    }

    #[tokio::test]
    async fn propagates_the_last_error_when_every_provider_fails() {
        let mut first = MockProvider::new();
        first
            .expect_transcribe()
            .times(1)
            .returning(|_| Err(Error::Network("connection refused".to_string())));
        first
            .expect_provider_id()
            .return_const("assemblyai".to_owned());

        let mut second = MockProvider::new();
        second
            .expect_transcribe()
            .times(1)
            .returning(|_| Err(Error::Timeout("polling budget exhausted".to_string())));
        second.expect_provider_id().return_const("deepgram".to_owned());

        let chain = TranscriberChain::new(vec![Arc::new(first), Arc::new(second)]);
        let result = chain
            .transcribe(Request::new("https://media.example.com/call.mp3"))
            .await;

        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn empty_chain_is_a_configuration_error() {
        let chain = TranscriberChain::new(Vec::new());
        assert!(chain.is_empty());

        let result = chain
            .transcribe(Request::new("https://media.example.com/call.mp3"))
            .await;

        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
