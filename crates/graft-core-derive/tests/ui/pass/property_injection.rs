use graft_core::container::{ServiceIdent, Token};
use graft_core_derive::injectable;
use std::sync::Arc;

pub trait Clock: Send + Sync {}
pub struct MetricsCollector;

fn clock_token() -> Token {
    Token::new("clock")
}

#[injectable]
pub struct Scheduler {
    #[property]
    metrics: Option<Arc<MetricsCollector>>,
    #[property(ident = clock_token())]
    clock: Option<Arc<dyn Clock>>,
    #[property(ident = ServiceIdent::name("timezone"))]
    timezone: Option<Arc<String>>,
    #[allow(dead_code)]
    #[inject]
    interval: Arc<u64>,
}

fn main() {}
