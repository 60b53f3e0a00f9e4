//! Scripted in-memory backend for tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::prompt::Contents;

use super::backend::{GenerationBackend, ImageOptions};
use super::model::GeneratedImage;

#[derive(Default)]
struct Script {
    texts: RefCell<VecDeque<StudioResult<String>>>,
    images: RefCell<VecDeque<StudioResult<Vec<GeneratedImage>>>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    text_calls: RefCell<Vec<(String, Contents)>>,
    image_calls: RefCell<Vec<(String, ImageOptions)>>,
}

/// Replies from a queue. Clones share the same script and call log.
#[derive(Clone, Default)]
pub(crate) struct ScriptedBackend {
    script: Rc<Script>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, reply: StudioResult<&str>) -> Self {
        self.script
            .texts
            .borrow_mut()
            .push_back(reply.map(str::to_string));
        self
    }

    pub fn with_images(self, reply: StudioResult<Vec<GeneratedImage>>) -> Self {
        self.script.images.borrow_mut().push_back(reply);
        self
    }

    /// Text calls wait until the sender fires.
    pub fn gated(self, gate: oneshot::Receiver<()>) -> Self {
        *self.script.gate.borrow_mut() = Some(gate);
        self
    }

    pub fn text_calls(&self) -> Vec<(String, Contents)> {
        self.script.text_calls.borrow().clone()
    }

    pub fn image_calls(&self) -> Vec<(String, ImageOptions)> {
        self.script.image_calls.borrow().clone()
    }

    /// A factory handing out clones of this backend, counting builds.
    pub fn factory(
        &self,
    ) -> (
        impl Fn(&str, &StudioConfig) -> StudioResult<ScriptedBackend>,
        Rc<Cell<usize>>,
    ) {
        let builds = Rc::new(Cell::new(0));
        let counter = Rc::clone(&builds);
        let backend = self.clone();
        let factory = move |_credential: &str, _config: &StudioConfig| {
            counter.set(counter.get() + 1);
            Ok(backend.clone())
        };
        (factory, builds)
    }
}

#[async_trait(?Send)]
impl GenerationBackend for ScriptedBackend {
    async fn generate_text(
        &self,
        system_instruction: &str,
        contents: &Contents,
    ) -> StudioResult<String> {
        self.script
            .text_calls
            .borrow_mut()
            .push((system_instruction.to_string(), contents.clone()));

        let gate = self.script.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        self.script
            .texts
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(StudioError::malformed("no scripted text reply")))
    }

    async fn generate_images(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> StudioResult<Vec<GeneratedImage>> {
        self.script
            .image_calls
            .borrow_mut()
            .push((prompt.to_string(), options.clone()));

        self.script
            .images
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(StudioError::malformed("no scripted image reply")))
    }
}
