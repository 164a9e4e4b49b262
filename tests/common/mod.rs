#![allow(dead_code)]

use edge_launcher::actions::Action;
use edge_launcher::launcher::ActionExecutor;
use edge_launcher::plugin::{Mode, Plugin, Status};
use edge_launcher::render::{Element, PageView, Renderer};
use edge_launcher::thumbnail::Thumbnail;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Renderer that remembers every call.
#[derive(Default)]
pub struct RecordingRenderer {
    pub pages: Vec<(Mode, PageView)>,
    pub highlights: Vec<(Mode, Option<usize>)>,
    pub status: String,
    pub thumbnails: Vec<String>,
}

impl RecordingRenderer {
    pub fn last_page(&self) -> &PageView {
        &self.pages.last().expect("no page rendered").1
    }

    pub fn last_mode(&self) -> Mode {
        self.pages.last().expect("no page rendered").0
    }

    pub fn labels(&self) -> Vec<String> {
        self.last_page()
            .elements
            .iter()
            .map(|e| e.label.clone())
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render_page(&mut self, mode: Mode, page: PageView) {
        self.pages.push((mode, page));
    }

    fn highlight(&mut self, mode: Mode, selected: Option<usize>) {
        self.highlights.push((mode, selected));
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn thumbnail_ready(&mut self, key: &str, _thumbnail: Arc<Thumbnail>) {
        self.thumbnails.push(key.to_string());
    }
}

/// Plugin over a fixed list of labels.
pub struct ListPlugin {
    pub mode: Mode,
    pub items: Vec<String>,
    pub page_size: usize,
    /// Activate as a launch instead of a copy.
    pub launch: bool,
}

impl ListPlugin {
    pub fn new(mode: Mode, count: usize) -> Self {
        Self {
            mode,
            items: (0..count).map(|i| format!("item {i}")).collect(),
            page_size: 7,
            launch: false,
        }
    }

    pub fn with_items(mode: Mode, items: &[&str]) -> Self {
        Self {
            mode,
            items: items.iter().map(|s| s.to_string()).collect(),
            page_size: 7,
            launch: false,
        }
    }
}

impl Plugin for ListPlugin {
    type Item = String;

    fn mode(&self) -> Mode {
        self.mode
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn load(&mut self) -> Option<Vec<String>> {
        Some(self.items.clone())
    }

    fn matches(&self, item: &String, query: &str) -> bool {
        item.to_lowercase().contains(query)
    }

    fn element(&self, item: &String) -> Element {
        Element::new(item, item)
    }

    fn action(&self, item: &String) -> Action {
        if self.launch {
            Action::Launch {
                command: item.clone(),
                usage_key: Some(item.clone()),
            }
        } else {
            Action::CopyText(item.clone())
        }
    }

    fn status(&self, selected: Option<&String>, status: &Status<'_>) -> String {
        match selected {
            Some(item) => item.clone(),
            None => format!("{} of {}", status.matches, status.total),
        }
    }
}

/// Executor that records actions instead of running them.
#[derive(Default)]
pub struct RecordingExecutor {
    pub executed: Vec<Action>,
    pub fail: bool,
}

impl ActionExecutor for RecordingExecutor {
    fn execute(&mut self, action: &Action) -> anyhow::Result<()> {
        self.executed.push(action.clone());
        if self.fail {
            anyhow::bail!("refused");
        }
        Ok(())
    }
}

/// Call `step` until it returns true or `timeout` passes.
pub fn wait_until(timeout: Duration, mut step: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if step() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    step()
}

type Respond = dyn Fn(&str) -> (u16, String) + Send + Sync;

/// Minimal HTTP server on a local port. Every request path (with its query)
/// is recorded and answered by `respond`.
pub struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start(respond: impl Fn(&str) -> (u16, String) + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let respond: Arc<Respond> = Arc::new(respond);
        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let _ = serve(stream, &seen, respond.as_ref());
            }
        });
        Self { url, requests }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn serve(mut stream: TcpStream, seen: &Mutex<Vec<String>>, respond: &Respond) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }
    }
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();
    seen.lock().unwrap().push(path.clone());

    let (status, body) = respond(&path);
    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes())?;
    stream.flush()
}
