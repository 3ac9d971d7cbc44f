// ABOUTME: Pluggable page preparation run after the settle delay and before DOM extraction.
// ABOUTME: NoConditioning leaves the page alone; AutoScroll scrolls in bounded steps to trigger lazy loading.

use std::time::Duration;

use async_trait::async_trait;

use super::{Page, PageError};

/// A pre-extraction step such as banner dismissal or lazy-load scrolling.
#[async_trait]
pub trait PageConditioner: Send + Sync {
    async fn condition(&self, page: &mut dyn Page) -> Result<(), PageError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoConditioning;

#[async_trait]
impl PageConditioner for NoConditioning {
    async fn condition(&self, _page: &mut dyn Page) -> Result<(), PageError> {
        Ok(())
    }
}

/// Scrolls down a fixed number of steps, pausing between them.
#[derive(Debug, Clone, Copy)]
pub struct AutoScroll {
    pub steps: usize,
    pub step_px: u32,
    pub interval: Duration,
}

impl Default for AutoScroll {
    fn default() -> Self {
        Self {
            steps: 12,
            step_px: 800,
            interval: Duration::from_millis(250),
        }
    }
}

#[async_trait]
impl PageConditioner for AutoScroll {
    async fn condition(&self, page: &mut dyn Page) -> Result<(), PageError> {
        let script = format!("window.scrollBy(0, {}); document.body.scrollHeight", self.step_px);
        for _ in 0..self.steps {
            page.evaluate(&script).await?;
            tokio::time::sleep(self.interval).await;
        }
        page.evaluate("window.scrollTo(0, 0)").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use serde_json::Value;

    /// Records scripts and fails `evaluate` after `fail_after` calls.
    #[derive(Default)]
    struct ScriptedPage {
        scripts: Vec<String>,
        fail_after: Option<usize>,
    }

    #[async_trait]
    impl Page for ScriptedPage {
        async fn goto(&mut self, _url: &str, _timeout: Duration) -> Result<(), PageError> {
            Ok(())
        }

        async fn set_extra_headers(&mut self, _headers: HashMap<String, String>) -> Result<(), PageError> {
            Ok(())
        }

        async fn count(&mut self, _selector: &str) -> Result<usize, PageError> {
            Ok(0)
        }

        async fn content(&mut self) -> Result<String, PageError> {
            Ok(String::new())
        }

        async fn evaluate(&mut self, script: &str) -> Result<Value, PageError> {
            if self.fail_after.is_some_and(|n| self.scripts.len() >= n) {
                return Err(PageError::Evaluate("page closed".into()));
            }
            self.scripts.push(script.to_string());
            Ok(Value::Null)
        }

        async fn screenshot(&mut self) -> Result<Vec<u8>, PageError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn auto_scroll_runs_each_step_then_returns_to_top() {
        let scroll = AutoScroll {
            steps: 3,
            step_px: 500,
            interval: Duration::from_millis(100),
        };
        let mut page = ScriptedPage::default();
        scroll.condition(&mut page).await.unwrap();

        assert_eq!(page.scripts.len(), scroll.steps + 1);
        assert!(page.scripts[0].contains("scrollBy(0, 500)"));
        assert_eq!(page.scripts[3], "window.scrollTo(0, 0)");
    }

    #[tokio::test(start_paused = true)]
    async fn auto_scroll_stops_on_evaluate_error() {
        let mut page = ScriptedPage {
            fail_after: Some(2),
            ..Default::default()
        };
        let err = AutoScroll::default().condition(&mut page).await.unwrap_err();
        assert!(matches!(err, PageError::Evaluate(_)));
        assert_eq!(page.scripts.len(), 2);
    }

    #[tokio::test]
    async fn no_conditioning_touches_nothing() {
        let mut page = ScriptedPage::default();
        NoConditioning.condition(&mut page).await.unwrap();
        assert!(page.scripts.is_empty());
    }
}
