//! Minimal HTTP/1.1 stub standing in for GitHub, PokéAPI and the relay.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use trainercard::{CardClient, CardConfig, SpeciesId};
use url::Url;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl Route {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body: body.to_string().into_bytes(),
            delay: Duration::ZERO,
        }
    }

    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "image/png",
            body: bytes,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request as seen by the stub: path plus lowercased header lines.
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl Seen {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

type Routes = Arc<Mutex<HashMap<String, Route>>>;

pub struct StubServer {
    base: Url,
    routes: Routes,
    seen: Arc<Mutex<Vec<Seen>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base = Url::parse(&format!("http://{addr}/")).unwrap();

        let routes: Routes = Arc::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let task = {
            let routes = routes.clone();
            let seen = seen.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve(stream, routes.clone(), seen.clone()));
                }
            })
        };

        Self {
            base,
            routes,
            seen,
            task,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL of `path` on this server.
    pub fn url(&self, path: &str) -> String {
        self.base.join(path.trim_start_matches('/')).unwrap().to_string()
    }

    pub fn route(&self, path: &str, route: Route) -> &Self {
        self.routes.lock().unwrap().insert(path.to_owned(), route);
        self
    }

    pub fn seen(&self, path: &str) -> Vec<Seen> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.path == path)
            .cloned()
            .collect()
    }

    pub fn config(&self) -> CardConfig {
        CardConfig::with_base(&self.base).unwrap()
    }

    pub fn client(&self) -> CardClient {
        CardClient::new(self.config()).unwrap()
    }

    /// Register a complete, healthy card for `username`.
    pub fn healthy_card(&self, username: &str, species: &str, types: &[&str]) {
        let id = SpeciesId::derive(username).get();
        self.route(&format!("/users/{username}"), Route::json(200, profile(self, username)))
            .route(
                &format!("/users/{username}/events/public"),
                Route::json(200, push_events(&[3, 2])),
            )
            .route(&format!("/avatars/{username}.png"), Route::png(png_bytes(8, 8)))
            .route(
                &format!("/pokemon/{id}"),
                Route::json(200, species_json(self, id, species, types)),
            )
            .route(&format!("/sprites/{id}.png"), Route::png(png_bytes(8, 8)));
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut stream: TcpStream, routes: Routes, seen: Arc<Mutex<Vec<Seen>>>) {
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&raw).into_owned();
    let mut lines = head.split("\r\n");
    let path = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_owned();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_owned()))
        .collect();
    seen.lock().unwrap().push(Seen {
        path: path.clone(),
        headers,
    });

    let route = routes
        .lock()
        .unwrap()
        .get(&path)
        .cloned()
        .unwrap_or_else(|| Route::json(404, json!({ "message": "Not Found" })));

    tokio::time::sleep(route.delay).await;

    let head = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status,
        route.content_type,
        route.body.len()
    );
    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream.write_all(&route.body).await;
    let _ = stream.shutdown().await;
}

pub fn profile(server: &StubServer, login: &str) -> Value {
    json!({
        "login": login,
        "avatar_url": server.url(&format!("/avatars/{login}.png")),
        "public_repos": 8,
        "followers": 42,
        "created_at": "2011-01-25T18:44:36Z",
    })
}

pub fn species_json(server: &StubServer, id: u32, name: &str, types: &[&str]) -> Value {
    let types: Vec<Value> = types
        .iter()
        .enumerate()
        .map(|(i, t)| json!({ "slot": i + 1, "type": { "name": t, "url": "" } }))
        .collect();
    json!({
        "id": id,
        "name": name,
        "sprites": { "front_default": server.url(&format!("/sprites/{id}.png")) },
        "types": types,
    })
}

pub fn push_events(commits_per_push: &[usize]) -> Value {
    let mut events: Vec<Value> = commits_per_push
        .iter()
        .map(|n| {
            let commits: Vec<Value> = (0..*n).map(|i| json!({ "sha": format!("{i:040}") })).collect();
            json!({ "type": "PushEvent", "payload": { "commits": commits } })
        })
        .collect();
    events.push(json!({ "type": "WatchEvent", "payload": { "action": "started" } }));
    Value::Array(events)
}

pub fn rate_limited_403() -> Route {
    Route::json(
        403,
        json!({
            "message": "API rate limit exceeded for 127.0.0.1.",
            "documentation_url": "https://docs.github.com/rest/overview/resources-in-the-rest-api#rate-limiting",
        }),
    )
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([40, 120, 200, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageOutputFormat::Png)
        .unwrap();
    out.into_inner()
}
