//! Headless Chromium session backed by `chromiumoxide`.
//!
//! The session owns a small tokio runtime so the blocking
//! [`BrowserSession`] interface can drive the async CDP client.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::runtime::Runtime;

use super::{BrowserSession, DisclosurePlan, SessionFactory};
use crate::error::{Error, Result};

/// Environment variable naming the Chromium executable.
pub const CHROMIUM_PATH_ENV: &str = "PETFOOD_CHROMIUM_PATH";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Labels this short also match by substring when no exact match exists.
const SHORT_LABEL_CHARS: usize = 20;

/// Removes iframes and high z-index overlays that intercept clicks.
const REMOVE_OVERLAYS_JS: &str = r"
(() => {
  document.querySelectorAll('iframe').forEach(el => el.remove());
  let removed = 0;
  document.querySelectorAll('body *').forEach(el => {
    const style = window.getComputedStyle(el);
    const z = parseInt(style.zIndex, 10);
    if ((style.position === 'fixed' || style.position === 'absolute') && z > 100) {
      el.remove();
      removed += 1;
    }
  });
  return removed;
})()
";

/// Launches [`ChromiumSession`]s.
#[derive(Debug, Clone, Default)]
pub struct ChromiumFactory {
    executable: Option<PathBuf>,
}

impl ChromiumFactory {
    /// Use `PETFOOD_CHROMIUM_PATH` when set, else let chromiumoxide search.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            executable: std::env::var_os(CHROMIUM_PATH_ENV).map(PathBuf::from),
        }
    }

    #[must_use]
    pub fn with_executable(path: impl Into<PathBuf>) -> Self {
        Self {
            executable: Some(path.into()),
        }
    }
}

impl SessionFactory for ChromiumFactory {
    fn create(&self) -> Result<Box<dyn BrowserSession>> {
        Ok(Box::new(ChromiumSession::launch(self.executable.clone())?))
    }
}

/// One browser process with a single reusable tab.
pub struct ChromiumSession {
    runtime: Runtime,
    browser: Option<Browser>,
    page: Option<Page>,
}

impl ChromiumSession {
    /// Start headless Chromium and open a blank tab.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Escalation`] when the runtime, browser or tab cannot
    /// be created.
    pub fn launch(executable: Option<PathBuf>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| escalation("runtime", e))?;

        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--window-size=1920,1080")
            .arg(format!("--user-agent={USER_AGENT}"));
        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(|e| escalation("browser config", e))?;

        let (browser, page) = runtime.block_on(async {
            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| escalation("launch", e))?;

            tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| escalation("new page", e))?;
            Ok::<_, Error>((browser, page))
        })?;

        tracing::debug!("chromium session started");
        Ok(Self {
            runtime,
            browser: Some(browser),
            page: Some(page),
        })
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| Error::Escalation("session is closed".to_string()))
    }

    async fn click_label(page: &Page, label: &str, allow_substring: bool) -> Result<bool> {
        let label_json = serde_json::to_string(label)?;
        let script = format!(
            r"
(() => {{
  const wanted = {label_json}.trim().toLowerCase();
  const nodes = Array.from(document.querySelectorAll(
    'button, a, summary, [role=button], [role=tab], [aria-expanded], h2, h3, h4, span, div'
  ));
  const text = el => (el.innerText || el.textContent || '').trim().toLowerCase();
  let target = nodes.find(el => text(el) === wanted);
  if (!target && {allow_substring}) {{
    target = nodes.find(el => {{ const t = text(el); return t.length < 60 && t.includes(wanted); }});
  }}
  if (!target) return false;
  target.scrollIntoView({{block: 'center'}});
  target.click();
  return true;
}})()
"
        );

        let clicked: bool = page
            .evaluate(script)
            .await
            .map_err(|e| escalation("click", e))?
            .into_value()
            .map_err(|e| escalation("click result", e))?;
        Ok(clicked)
    }
}

impl BrowserSession for ChromiumSession {
    fn is_alive(&mut self) -> bool {
        let Some(page) = self.page.as_ref() else {
            return false;
        };
        self.runtime
            .block_on(tokio::time::timeout(Duration::from_secs(5), page.url()))
            .is_ok_and(|res| res.is_ok())
    }

    fn render(&mut self, url: &str, plan: &DisclosurePlan) -> Result<String> {
        let page = self.page()?;

        self.runtime.block_on(async {
            page.goto(url).await.map_err(|e| escalation("navigate", e))?;
            // Some pages never fire a second navigation event; a missing one is fine.
            let _ = tokio::time::timeout(Duration::from_secs(15), page.wait_for_navigation()).await;
            tokio::time::sleep(plan.page_wait).await;

            if let Err(err) = page.evaluate(REMOVE_OVERLAYS_JS).await {
                tracing::debug!(error = %err, "overlay removal failed");
            }

            let mut clicks = 0;
            for label in &plan.labels {
                if clicks >= plan.max_clicks {
                    break;
                }
                let short = label.chars().count() <= SHORT_LABEL_CHARS;
                match Self::click_label(page, label, short).await {
                    Ok(true) => {
                        clicks += 1;
                        tracing::debug!(label = %label, "clicked disclosure control");
                        tokio::time::sleep(plan.click_wait).await;
                    }
                    Ok(false) => {}
                    Err(err) => tracing::debug!(label = %label, error = %err, "click failed"),
                }
            }

            let html: String = page
                .evaluate("document.documentElement.outerHTML")
                .await
                .map_err(|e| escalation("read html", e))?
                .into_value()
                .map_err(|e| escalation("html result", e))?;
            Ok(html)
        })
    }

    fn close(&mut self) {
        let page = self.page.take();
        let browser = self.browser.take();
        self.runtime.block_on(async {
            if let Some(page) = page {
                let _ = page.close().await;
            }
            if let Some(mut browser) = browser {
                let _ = browser.close().await;
                let _ = browser.wait().await;
            }
        });
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if self.browser.is_some() {
            self.close();
        }
    }
}

fn escalation(step: &str, err: impl std::fmt::Display) -> Error {
    Error::Escalation(format!("{step}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires a local Chromium"]
    fn renders_a_data_url() {
        let Ok(mut session) = ChromiumSession::launch(ChromiumFactory::from_env().executable) else {
            panic!("failed to launch chromium");
        };
        assert!(session.is_alive());

        let plan = DisclosurePlan {
            page_wait: Duration::from_millis(100),
            click_wait: Duration::from_millis(100),
            ..DisclosurePlan::default()
        };
        let html = session.render("data:text/html,<button>Ingredients</button><p>Tuna</p>", &plan);
        assert!(html.is_ok_and(|h| h.contains("Tuna")));
        session.close();
        assert!(!session.is_alive());
    }
}
