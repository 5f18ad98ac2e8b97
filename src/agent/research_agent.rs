//! Browser research agent
//!
//! Drives a browser session with an LLM using a ReAct-style loop
//! (Thought → Action → Observation) until the model answers the task.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::loop_state::{AgentHistory, Observation};
use crate::core::{Message, ResearchTask, Result, ToolCall};
use crate::llm::{GenerateOptions, LLMProvider, LLMResponse};
use crate::tools::browser::{BrowserAction, BrowserSession};
use crate::tools::ToolRegistry;

/// Something that can answer a research task inside a browser session.
///
/// Implementations must not close the session; its owner does.
#[async_trait]
pub trait ResearchAgent: Send + Sync {
    async fn run(&self, task: &ResearchTask, session: &dyn BrowserSession)
        -> Result<AgentHistory>;
}

const SYSTEM_PROMPT: &str = r#"You are a web research agent controlling a real browser. Follow the ReAct pattern:
1. THINK about what information you still need.
2. ACT by calling browser tools.
3. OBSERVE the results and continue, or give your final answer.

## Browser Tools
- `browser_url`: Navigate to a URL. Returns a snapshot with [ref=eN] tags.
- `browser_snapshot`: Re-read the current page.
- `browser_click` / `browser_get_text`: Args: {"ref": "e8"}
- `browser_fill`: Args: {"ref": "e5", "text": "search query"}
- `browser_scroll`: Args: {"direction": "down"}
- `browser_press`: Args: {"key": "Enter"}

## Rules
- Use EXACT element refs from the LATEST observation.
- Prefer primary sources and cross-check facts across pages.
- When you have enough information, reply with the final answer as plain text and call no tools."#;

/// LLM-driven agent operating a browser session
pub struct BrowserResearchAgent {
    /// Model backend
    llm: Arc<dyn LLMProvider>,
    /// Model name sent with each request
    model: String,
    /// Whether screenshots are offered and attached
    use_vision: bool,
    /// Step budget before synthesizing
    max_steps: usize,
    /// Advertised browser tools
    tools: ToolRegistry,
}

impl BrowserResearchAgent {
    /// Create an agent over any LLM provider
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        model: impl Into<String>,
        use_vision: bool,
        max_steps: usize,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            use_vision,
            max_steps: max_steps.max(1),
            tools: ToolRegistry::new(use_vision),
        }
    }

    /// Ask the model for the next step given everything observed so far
    async fn next_step(
        &self,
        task: &ResearchTask,
        history: &AgentHistory,
        screenshot: Option<String>,
    ) -> Result<LLMResponse> {
        let user_content = format!(
            "Task: {}\n\nStep {} of {}.{}",
            task,
            history.steps_taken() + 1,
            history.max_steps,
            history.format_observations()
        );

        let mut user = Message::user(user_content);
        if let Some(image) = screenshot {
            user = user.with_image(image);
        }

        let messages = vec![Message::system(SYSTEM_PROMPT), user];

        debug!(
            tools = self.tools.definitions().len(),
            steps = history.steps_taken(),
            "calling agent model"
        );

        self.llm
            .chat_with_tools(
                &self.model,
                &messages,
                self.tools.definitions(),
                Some(GenerateOptions::with_temperature(0.1)),
            )
            .await
    }

    /// Execute tool calls sequentially (page state dependent)
    ///
    /// Browser failures become error observations so the model can recover.
    async fn execute_tools(
        &self,
        tool_calls: &[ToolCall],
        session: &dyn BrowserSession,
        screenshot: &mut Option<String>,
    ) -> Vec<Observation> {
        let mut observations = Vec::with_capacity(tool_calls.len());

        for tool_call in tool_calls {
            let action = match self.tools.to_action(tool_call) {
                Ok(action) => action,
                Err(e) => {
                    observations.push(Observation::error(&tool_call.name, e.to_string()));
                    continue;
                }
            };

            debug!(session = session.name(), action = %action, "executing browser action");

            match session.execute(&action).await {
                Ok(result) => {
                    if action == BrowserAction::Screenshot && self.use_vision {
                        if let Some(serde_json::Value::String(ref image)) = result.data {
                            *screenshot = Some(image.clone());
                        }
                    }
                    observations.push(Observation::from(result));
                }
                Err(e) => observations.push(Observation::error(&tool_call.name, e.to_string())),
            }
        }

        observations
    }

    /// Screenshot of the page as the step left it; `None` if capture fails
    async fn capture_screenshot(&self, session: &dyn BrowserSession) -> Option<String> {
        match session.execute(&BrowserAction::Screenshot).await {
            Ok(result) => match result.data {
                Some(serde_json::Value::String(image)) => Some(image),
                _ => None,
            },
            Err(e) => {
                warn!(session = session.name(), error = %e, "screenshot capture failed");
                None
            }
        }
    }

    /// Produce an answer from observations when the step budget runs out
    async fn synthesize(&self, task: &ResearchTask, history: &AgentHistory) -> Result<String> {
        let prompt = format!(
            "Answer the following research task as well as possible using only these browser observations.\n\nTask: {}{}",
            task,
            history.format_observations()
        );

        let response = self
            .llm
            .chat(
                &self.model,
                &[Message::user(prompt)],
                Some(GenerateOptions::with_temperature(0.3)),
            )
            .await?;

        Ok(response.content)
    }
}

#[async_trait]
impl ResearchAgent for BrowserResearchAgent {
    async fn run(
        &self,
        task: &ResearchTask,
        session: &dyn BrowserSession,
    ) -> Result<AgentHistory> {
        let mut history = AgentHistory::new(self.max_steps);
        let mut screenshot: Option<String> = None;

        info!(
            provider = self.llm.name(),
            model = %self.model,
            max_steps = self.max_steps,
            "agent started"
        );

        while history.should_continue() {
            let response = self.next_step(task, &history, screenshot.take()).await?;
            if let Some(usage) = response.usage {
                debug!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "model usage"
                );
            }

            if !response.has_tool_calls() {
                let answer = response.content.trim();
                if !answer.is_empty() {
                    history.final_answer = Some(answer.to_string());
                    debug!(step = history.steps_taken() + 1, "final answer received");
                }
                break;
            }

            info!(
                step = history.steps_taken() + 1,
                tools = response.tool_calls.len(),
                "agent step"
            );

            let observations = self
                .execute_tools(&response.tool_calls, session, &mut screenshot)
                .await;
            history.record_step(response.content.trim(), observations);

            if self.use_vision && screenshot.is_none() {
                screenshot = self.capture_screenshot(session).await;
            }
        }

        if history.final_answer.is_none() {
            info!(
                steps = history.steps_taken(),
                "no direct answer; synthesizing from observations"
            );
            let answer = self.synthesize(task, &history).await?;
            if !answer.trim().is_empty() {
                history.final_answer = Some(answer.trim().to_string());
            }
        }

        info!(
            steps = history.steps_taken(),
            observations = history.observations().count(),
            "agent complete"
        );

        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BenchError, ToolDefinition, ToolResult};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// LLM that replays canned responses
    struct ScriptedLlm {
        responses: Mutex<VecDeque<LLMResponse>>,
        prompts: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<LLMResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, messages: &[Message]) -> Result<LLMResponse> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| BenchError::llm("script exhausted"))
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedLlm {
        async fn chat_with_tools(
            &self,
            _model: &str,
            messages: &[Message],
            _tools: &[ToolDefinition],
            _options: Option<GenerateOptions>,
        ) -> Result<LLMResponse> {
            self.next(messages)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// Session that records actions and answers with fixed text
    #[derive(Default)]
    struct RecordingSession {
        actions: Mutex<Vec<BrowserAction>>,
    }

    #[async_trait]
    impl BrowserSession for RecordingSession {
        fn name(&self) -> &str {
            "recording"
        }

        async fn execute(&self, action: &BrowserAction) -> Result<ToolResult> {
            self.actions.lock().unwrap().push(action.clone());
            match action {
                BrowserAction::Click { .. } => Err(BenchError::browser("element not found")),
                BrowserAction::Screenshot => Ok(ToolResult::success_with_data(
                    "browser_screenshot",
                    "Screenshot captured",
                    serde_json::Value::String("cGl4ZWxz".to_string()),
                )),
                _ => Ok(ToolResult::success(action.tool_name(), "page text")),
            }
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn answer(text: &str) -> LLMResponse {
        LLMResponse {
            content: text.to_string(),
            ..Default::default()
        }
    }

    fn call(name: &str, args: serde_json::Value) -> LLMResponse {
        LLMResponse {
            tool_calls: vec![ToolCall::new(name, args)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let llm = Arc::new(ScriptedLlm::new(vec![answer("1999")]));
        let agent = BrowserResearchAgent::new(llm, "test-model", false, 5);
        let session = RecordingSession::default();

        let history = agent
            .run(&ResearchTask::new("what year was X founded?"), &session)
            .await
            .unwrap();

        assert_eq!(history.final_result(), Some("1999"));
        assert!(session.actions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tool_step_then_answer() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            call("browser_url", serde_json::json!({"url": "https://example.com"})),
            call("browser_click", serde_json::json!({"ref": "e1"})),
            answer("Founded in 1999."),
        ]));
        let agent = BrowserResearchAgent::new(llm.clone(), "test-model", false, 5);
        let session = RecordingSession::default();

        let history = agent
            .run(&ResearchTask::new("what year was X founded?"), &session)
            .await
            .unwrap();

        assert_eq!(history.final_result(), Some("Founded in 1999."));
        assert_eq!(history.steps_taken(), 2);
        let observations: Vec<_> = history.observations().collect();
        assert_eq!(observations.len(), 2);
        assert!(observations[0].success);
        assert!(!observations[1].success);

        // The failed click is replayed to the model
        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[2][1].content.contains("element not found"));
    }

    #[tokio::test]
    async fn test_synthesizes_when_budget_exhausted() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            call("browser_snapshot", serde_json::json!({})),
            answer("Best guess: 1999"),
        ]));
        let agent = BrowserResearchAgent::new(llm, "test-model", false, 1);
        let session = RecordingSession::default();

        let history = agent
            .run(&ResearchTask::new("what year was X founded?"), &session)
            .await
            .unwrap();

        assert_eq!(history.steps_taken(), 1);
        assert_eq!(history.final_result(), Some("Best guess: 1999"));
    }

    #[tokio::test]
    async fn test_screenshot_attached_with_vision() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            call("browser_screenshot", serde_json::json!({})),
            answer("done"),
        ]));
        let agent = BrowserResearchAgent::new(llm.clone(), "test-model", true, 5);
        let session = RecordingSession::default();

        agent
            .run(&ResearchTask::new("describe the page"), &session)
            .await
            .unwrap();

        assert_eq!(session.actions.lock().unwrap().len(), 1);
        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0][1].images.is_empty());
        assert_eq!(prompts[1][1].images, vec!["cGl4ZWxz".to_string()]);
    }

    #[tokio::test]
    async fn test_vision_captures_after_each_step() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            call("browser_url", serde_json::json!({"url": "https://example.com"})),
            answer("done"),
        ]));
        let agent = BrowserResearchAgent::new(llm.clone(), "test-model", true, 5);
        let session = RecordingSession::default();

        agent
            .run(&ResearchTask::new("describe the page"), &session)
            .await
            .unwrap();

        assert_eq!(
            *session.actions.lock().unwrap(),
            vec![
                BrowserAction::Open {
                    url: "https://example.com".to_string()
                },
                BrowserAction::Screenshot,
            ]
        );
        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts[1][1].images, vec!["cGl4ZWxz".to_string()]);
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let llm = Arc::new(ScriptedLlm::new(vec![]));
        let agent = BrowserResearchAgent::new(llm, "test-model", false, 5);
        let session = RecordingSession::default();

        let result = agent.run(&ResearchTask::new("anything"), &session).await;
        assert!(matches!(result, Err(BenchError::Llm(_))));
    }
}
