//! Playwright browser automation
//!
//! A [`PlaywrightSession`] keeps one Node process alive for the lifetime of a
//! browser tab. Commands go to the bridge as JSON lines on stdin, replies come
//! back as JSON lines on stdout, matched by request id.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::page::{Key, LoadState, Locator, Page};

/// Extra time granted to a bridge reply on top of the action timeout
const REPLY_MARGIN: Duration = Duration::from_secs(5);

/// Upper bound on a single text read; assertions poll, so reads must not
/// wait out the page default timeout
const TEXT_READ_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser: {}", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Default timeout applied to every Playwright action
    pub action_timeout_ms: u64,

    /// How long to wait for the browser to come up
    pub launch_timeout_ms: u64,

    /// `node_modules` directory that contains the `playwright` package
    pub node_path: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout_ms: 30_000,
            launch_timeout_ms: 60_000,
            node_path: PathBuf::from("node_modules"),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum BridgeCommand<'a> {
    Goto { url: &'a str },
    Url,
    Fill { selector: &'a str, value: &'a str },
    Click { selector: &'a str },
    ClickAndWait { selector: &'a str, state: LoadState },
    Press { selector: &'a str, key: &'a str },
    Focus { selector: &'a str },
    TextContent { selector: &'a str, timeout: u64 },
    Count { selector: &'a str },
    IsVisible { selector: &'a str },
    WaitForLoadState { state: LoadState },
    Screenshot { path: &'a Path },
    Close,
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    id: u64,
    #[serde(flatten)]
    command: &'a BridgeCommand<'a>,
}

#[derive(Debug, Deserialize)]
struct BridgeReply {
    id: u64,
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

struct BridgeIo {
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

/// Live browser tab driven through the Playwright bridge
pub struct PlaywrightSession {
    child: Mutex<Child>,
    io: Mutex<BridgeIo>,
    next_id: AtomicU64,
    reply_timeout: Duration,

    /// Keeps the bridge script on disk while node runs
    _script_dir: tempfile::TempDir,
}

impl PlaywrightSession {
    /// Launch a browser and open one page
    pub async fn launch(config: &PlaywrightConfig, base_url: &str) -> E2eResult<Self> {
        Self::check_playwright_installed().await?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, build_bridge_script(config, base_url))?;

        let node_path = std::env::current_dir()?.join(&config.node_path);
        debug!("Starting Playwright bridge: {}", script_path.display());

        let mut child = Command::new("node")
            .arg(&script_path)
            .env("NODE_PATH", &node_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Bridge(format!("failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdout unavailable".into()))?;

        let session = Self {
            child: Mutex::new(child),
            io: Mutex::new(BridgeIo {
                stdin,
                stdout: BufReader::new(stdout).lines(),
            }),
            next_id: AtomicU64::new(1),
            reply_timeout: Duration::from_millis(config.action_timeout_ms) + REPLY_MARGIN,
            _script_dir: script_dir,
        };

        let launch_timeout = Duration::from_millis(config.launch_timeout_ms);
        {
            let mut io = session.io.lock().await;
            tokio::time::timeout(launch_timeout, read_reply(&mut io, 0))
                .await
                .map_err(|_| E2eError::Timeout("browser launch".into()))??;
        }

        info!("{} browser ready (headless: {})", config.browser.as_str(), config.headless);
        Ok(session)
    }

    /// Check if Playwright is installed
    async fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    async fn request(&self, command: BridgeCommand<'_>) -> E2eResult<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_string(&Envelope { id, command: &command })?;
        line.push('\n');

        let mut io = self.io.lock().await;
        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.flush().await?;

        let reply = tokio::time::timeout(self.reply_timeout, read_reply(&mut io, id))
            .await
            .map_err(|_| E2eError::Timeout(format!("bridge reply to {:?}", command)))??;
        Ok(reply)
    }
}

async fn read_reply(io: &mut BridgeIo, id: u64) -> E2eResult<serde_json::Value> {
    loop {
        let line = io
            .stdout
            .next_line()
            .await?
            .ok_or_else(|| E2eError::Bridge("bridge exited".into()))?;

        let reply: BridgeReply = match serde_json::from_str(&line) {
            Ok(reply) => reply,
            Err(_) => {
                debug!("[bridge] {}", line);
                continue;
            }
        };

        if reply.id != id {
            warn!("Dropping stale bridge reply {} (waiting for {})", reply.id, id);
            continue;
        }

        return if reply.ok {
            Ok(reply.value)
        } else {
            Err(E2eError::Playwright(
                reply.error.unwrap_or_else(|| "unknown bridge error".into()),
            ))
        };
    }
}

#[async_trait]
impl Page for PlaywrightSession {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.request(BridgeCommand::Goto { url }).await?;
        Ok(())
    }

    async fn url(&self) -> E2eResult<String> {
        let value = self.request(BridgeCommand::Url).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        let selector = locator.as_str();
        self.request(BridgeCommand::Fill { selector, value }).await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        let selector = locator.as_str();
        self.request(BridgeCommand::Click { selector }).await?;
        Ok(())
    }

    async fn click_and_wait(&self, locator: &Locator, state: LoadState) -> E2eResult<()> {
        let selector = locator.as_str();
        self.request(BridgeCommand::ClickAndWait { selector, state }).await?;
        Ok(())
    }

    async fn press(&self, locator: &Locator, key: Key) -> E2eResult<()> {
        let selector = locator.as_str();
        self.request(BridgeCommand::Press { selector, key: key.as_str() }).await?;
        Ok(())
    }

    async fn focus(&self, locator: &Locator) -> E2eResult<()> {
        let selector = locator.as_str();
        self.request(BridgeCommand::Focus { selector }).await?;
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> E2eResult<Option<String>> {
        let selector = locator.as_str();
        let value = self
            .request(BridgeCommand::TextContent { selector, timeout: TEXT_READ_TIMEOUT_MS })
            .await?;
        Ok(value.as_str().map(String::from))
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        let selector = locator.as_str();
        let value = self.request(BridgeCommand::Count { selector }).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool> {
        let selector = locator.as_str();
        let value = self.request(BridgeCommand::IsVisible { selector }).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn wait_for_load_state(&self, state: LoadState) -> E2eResult<()> {
        self.request(BridgeCommand::WaitForLoadState { state }).await?;
        Ok(())
    }

    async fn wait_for_timeout(&self, duration: Duration) -> E2eResult<()> {
        tokio::time::sleep(duration).await;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.request(BridgeCommand::Screenshot { path }).await?;
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        self.request(BridgeCommand::Close).await?;
        let mut child = self.child.lock().await;
        child.wait().await?;
        debug!("Playwright bridge closed");
        Ok(())
    }
}

/// Build the Node bridge that hosts the browser
fn build_bridge_script(config: &PlaywrightConfig, base_url: &str) -> String {
    format!(
        r#"
const {{ chromium, firefox, webkit }} = require('playwright');
const readline = require('readline');

const reply = (id, body) => process.stdout.write(JSON.stringify({{ id, ...body }}) + '\n');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    baseURL: {base_url},
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  page.setDefaultTimeout({timeout});
  reply(0, {{ ok: true }});

  const rl = readline.createInterface({{ input: process.stdin }});
  for await (const line of rl) {{
    if (!line.trim()) continue;
    const cmd = JSON.parse(line);
    try {{
      let value = null;
      switch (cmd.op) {{
        case 'goto': await page.goto(cmd.url); break;
        case 'url': value = page.url(); break;
        case 'fill': await page.locator(cmd.selector).fill(cmd.value); break;
        case 'click': await page.locator(cmd.selector).click(); break;
        case 'click_and_wait':
          await Promise.all([
            page.waitForLoadState(cmd.state),
            page.locator(cmd.selector).click(),
          ]);
          break;
        case 'press': await page.locator(cmd.selector).press(cmd.key); break;
        case 'focus': await page.locator(cmd.selector).focus(); break;
        case 'text_content': {{
          const locator = page.locator(cmd.selector);
          if (await locator.count() === 0) throw new Error('no element matches ' + cmd.selector);
          value = await locator.textContent({{ timeout: cmd.timeout }});
          break;
        }}
        case 'count': value = await page.locator(cmd.selector).count(); break;
        case 'is_visible': value = await page.locator(cmd.selector).isVisible(); break;
        case 'wait_for_load_state': await page.waitForLoadState(cmd.state); break;
        case 'screenshot': await page.screenshot({{ path: cmd.path, fullPage: true }}); break;
        case 'close':
          await browser.close();
          reply(cmd.id, {{ ok: true }});
          process.exit(0);
        default: throw new Error('unknown op: ' + cmd.op);
      }}
      reply(cmd.id, {{ ok: true, value }});
    }} catch (error) {{
      reply(cmd.id, {{ ok: false, error: error.message }});
    }}
  }}
  await browser.close();
}})().catch((error) => {{
  reply(0, {{ ok: false, error: error.message }});
  process.exit(1);
}});
"#,
        browser = config.browser.as_str(),
        headless = config.headless,
        base_url = serde_json::Value::String(base_url.to_string()),
        width = config.viewport_width,
        height = config.viewport_height,
        timeout = config.action_timeout_ms,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_flattens_command() {
        let command = BridgeCommand::Fill { selector: "input[name=\"username\"]", value: "Admin" };
        let json = serde_json::to_value(Envelope { id: 7, command: &command }).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["op"], "fill");
        assert_eq!(json["selector"], "input[name=\"username\"]");
        assert_eq!(json["value"], "Admin");
    }

    #[test]
    fn click_and_wait_serializes_load_state() {
        let command = BridgeCommand::ClickAndWait {
            selector: "button[type=\"submit\"]",
            state: LoadState::NetworkIdle,
        };
        let json = serde_json::to_value(Envelope { id: 1, command: &command }).unwrap();
        assert_eq!(json["op"], "click_and_wait");
        assert_eq!(json["state"], "networkidle");
    }

    #[test]
    fn bridge_script_uses_config() {
        let config = PlaywrightConfig {
            browser: Browser::Firefox,
            headless: false,
            ..Default::default()
        };
        let script = build_bridge_script(&config, "https://opensource-demo.orangehrmlive.com");
        assert!(script.contains("await firefox.launch({ headless: false })"));
        assert!(script.contains(r#"baseURL: "https://opensource-demo.orangehrmlive.com""#));
        assert!(script.contains("page.setDefaultTimeout(30000)"));
    }

    #[test]
    fn text_reads_are_bounded() {
        let command = BridgeCommand::TextContent {
            selector: ".oxd-alert-content",
            timeout: TEXT_READ_TIMEOUT_MS,
        };
        let json = serde_json::to_value(Envelope { id: 2, command: &command }).unwrap();
        assert_eq!(json["op"], "text_content");
        assert_eq!(json["timeout"], 1000);

        let script =
            build_bridge_script(&PlaywrightConfig::default(), "https://opensource-demo.orangehrmlive.com");
        assert!(script.contains("if (await locator.count() === 0) throw new Error('no element matches ' + cmd.selector);"));
        assert!(script.contains("await locator.textContent({ timeout: cmd.timeout })"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn install_check_does_not_block_the_runtime() {
        let ticker = tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(1)).await;
        });
        let check = PlaywrightSession::check_playwright_installed();
        match tokio::time::timeout(Duration::from_secs(60), check).await {
            Ok(Ok(())) | Ok(Err(E2eError::PlaywrightNotFound)) => {}
            Ok(Err(other)) => panic!("unexpected error: {}", other),
            Err(_) => panic!("install check hung"),
        }
        ticker.await.unwrap();
    }

    #[test]
    fn browser_from_str() {
        assert_eq!("Firefox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert_eq!("chrome".parse::<Browser>().unwrap(), Browser::Chromium);
        assert!("opera".parse::<Browser>().is_err());
    }

    #[test]
    fn reply_defaults() {
        let reply: BridgeReply = serde_json::from_str(r#"{"id":3,"ok":true}"#).unwrap();
        assert_eq!(reply.id, 3);
        assert!(reply.value.is_null());
        assert!(reply.error.is_none());
    }
}
