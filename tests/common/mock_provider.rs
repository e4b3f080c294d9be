use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use cdn_invalidate::{
    domain::{CallerReference, Target},
    provider::{CdnProvider, InvalidationClient, ProviderError},
};
use tokio::time::Instant;

#[derive(Clone, Debug)]
pub enum Submit {
    Accept,
    MissingId,
    Fail(&'static str),
}

#[derive(Clone, Debug)]
pub enum Reply {
    Status(&'static str),
    Missing,
    Fail(&'static str),
}

/// Behaviour of one distribution. The last reply repeats once the others are used up.
#[derive(Clone, Debug)]
pub struct Script {
    submit: Submit,
    replies: VecDeque<Reply>,
}

impl Script {
    pub fn new(submit: Submit, replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            submit,
            replies: replies.into_iter().collect(),
        }
    }

    /// Submission that never reaches the polling stage
    pub fn rejected(submit: Submit) -> Self {
        Self {
            submit,
            replies: VecDeque::new(),
        }
    }

    pub fn accept(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self::new(Submit::Accept, replies)
    }

    pub fn completed() -> Self {
        Self::accept([Reply::Status("Completed")])
    }
}

#[derive(Clone, Debug)]
pub struct CreateCall {
    pub distribution_id: String,
    pub caller_reference: CallerReference,
    pub paths: Vec<String>,
    pub access_key_id: String,
    pub region: String,
}

#[derive(Clone, Debug)]
pub struct StatusCall {
    pub distribution_id: String,
    pub invalidation_id: String,
    pub at: Instant,
}

#[derive(Default)]
struct State {
    scripts: HashMap<String, Script>,
    connects: usize,
    creates: Vec<CreateCall>,
    statuses: Vec<StatusCall>,
}

/// Records every call; distributions without a script complete on the first status check
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<State>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, distribution_id: &str, script: Script) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripts
            .insert(distribution_id.to_string(), script);
        self
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub fn creates(&self) -> Vec<CreateCall> {
        self.state.lock().unwrap().creates.clone()
    }

    pub fn statuses_for(&self, distribution_id: &str) -> Vec<StatusCall> {
        self.state
            .lock()
            .unwrap()
            .statuses
            .iter()
            .filter(|call| call.distribution_id == distribution_id)
            .cloned()
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.connects + state.creates.len() + state.statuses.len()
    }
}

#[async_trait]
impl CdnProvider for MockProvider {
    async fn client(&self, target: &Target) -> Result<Box<dyn InvalidationClient>, ProviderError> {
        self.state.lock().unwrap().connects += 1;

        Ok(Box::new(MockClient {
            state: Arc::clone(&self.state),
            access_key_id: target.credentials().access_key_id().to_string(),
            region: target.region().to_string(),
        }))
    }
}

struct MockClient {
    state: Arc<Mutex<State>>,
    access_key_id: String,
    region: String,
}

#[async_trait]
impl InvalidationClient for MockClient {
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        caller_reference: &CallerReference,
        paths: &[String],
    ) -> Result<Option<String>, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.creates.push(CreateCall {
            distribution_id: distribution_id.to_string(),
            caller_reference: caller_reference.clone(),
            paths: paths.to_vec(),
            access_key_id: self.access_key_id.clone(),
            region: self.region.clone(),
        });

        let submit = state
            .scripts
            .get(distribution_id)
            .map(|script| script.submit.clone())
            .unwrap_or(Submit::Accept);

        match submit {
            Submit::Accept => Ok(Some(format!("I-{distribution_id}"))),
            Submit::MissingId => Ok(None),
            Submit::Fail(message) => Err(ProviderError::Request(message.to_string())),
        }
    }

    async fn get_invalidation_status(
        &self,
        distribution_id: &str,
        invalidation_id: &str,
    ) -> Result<Option<String>, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.statuses.push(StatusCall {
            distribution_id: distribution_id.to_string(),
            invalidation_id: invalidation_id.to_string(),
            at: Instant::now(),
        });

        let script = state
            .scripts
            .entry(distribution_id.to_string())
            .or_insert_with(Script::completed);

        let reply = if script.replies.len() > 1 {
            script.replies.pop_front()
        } else {
            script.replies.front().cloned()
        };

        match reply.unwrap_or(Reply::Status("Completed")) {
            Reply::Status(status) => Ok(Some(status.to_string())),
            Reply::Missing => Ok(None),
            Reply::Fail(message) => Err(ProviderError::Request(message.to_string())),
        }
    }
}
