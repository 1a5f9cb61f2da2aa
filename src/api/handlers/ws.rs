// src/api/handlers/ws.rs
use actix::{Actor, AsyncContext, Handler, Message, Recipient, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;

use crate::query::{CacheEvent, QueryClient};

/// A cache event pushed to the browser so open pages can reload themselves.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct CacheNotice(pub CacheEvent);

/// Fan-out of cache notices to every open browser connection.
#[derive(Clone, Default)]
pub struct WsBroker {
    clients: Arc<RwLock<Vec<Recipient<CacheNotice>>>>,
}

impl WsBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, client: Recipient<CacheNotice>) {
        let mut clients = self.clients.write().await;
        clients.push(client);
    }

    pub async fn unregister(&self, client: &Recipient<CacheNotice>) {
        let mut clients = self.clients.write().await;
        clients.retain(|c| c != client);
    }

    pub async fn broadcast(&self, notice: CacheNotice) {
        let clients = self.clients.read().await;
        for client in clients.iter() {
            client.do_send(notice.clone());
        }
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Relay every cache event to connected browsers until the cache goes away.
    pub fn forward(&self, queries: &QueryClient) {
        let broker = self.clone();
        let mut events = queries.subscribe();
        actix_web::rt::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => broker.broadcast(CacheNotice(event)).await,
                    Err(RecvError::Lagged(missed)) => {
                        log::warn!("Websocket relay skipped {} cache events", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}

pub struct WsConnection {
    broker: WsBroker,
}

impl WsConnection {
    pub fn new(broker: WsBroker) -> Self {
        Self { broker }
    }
}

impl Actor for WsConnection {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let client = ctx.address().recipient();
        let broker = self.broker.clone();
        actix::spawn(async move {
            broker.register(client).await;
        });
    }

    fn stopped(&mut self, ctx: &mut Self::Context) {
        let client = ctx.address().recipient();
        let broker = self.broker.clone();
        actix::spawn(async move {
            broker.unregister(&client).await;
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsConnection {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => ctx.close(reason),
            _ => (),
        }
    }
}

impl Handler<CacheNotice> for WsConnection {
    type Result = ();

    fn handle(&mut self, msg: CacheNotice, ctx: &mut Self::Context) {
        if let Ok(json) = serde_json::to_string(&msg.0) {
            ctx.text(json);
        }
    }
}

pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    broker: web::Data<WsBroker>,
) -> Result<HttpResponse, Error> {
    let conn = WsConnection::new(broker.get_ref().clone());
    ws::start(conn, &req, stream)
}
