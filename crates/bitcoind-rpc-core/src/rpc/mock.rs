use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CoreError, DaemonError};

use super::types::{DaemonResponse, DaemonResponseError, HttpMethod};
use super::JsonRpcTransport;

/// A scripted JSON-RPC backend for testing.
///
/// Replies are queued per method. Each call consumes the front of its
/// queue; the last reply sticks and answers every later call. Methods with
/// no script fail like a daemon would (`-32601 Method not found`).
pub struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Result { status: u16, value: serde_json::Value },
    Error { code: i64, message: String },
}

/// One call as seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub endpoint: Option<String>,
    pub params: Vec<serde_json::Value>,
    pub http_method: HttpMethod,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            replies: HashMap::new(),
        }
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .expect("mock call log poisoned")
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    /// Method names in call order.
    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.method).collect()
    }

    /// The last call made to `method`.
    pub fn last_call(&self, method: &str) -> Option<RecordedCall> {
        self.calls().into_iter().rev().find(|call| call.method == method)
    }
}

pub struct MockTransportBuilder {
    replies: HashMap<String, VecDeque<Scripted>>,
}

impl MockTransportBuilder {
    pub fn reply(self, method: &str, value: serde_json::Value) -> Self {
        self.reply_status(method, 200, value)
    }

    pub fn reply_status(mut self, method: &str, status: u16, value: serde_json::Value) -> Self {
        self.replies
            .entry(method.to_owned())
            .or_default()
            .push_back(Scripted::Result { status, value });
        self
    }

    pub fn reply_error(mut self, method: &str, code: i64, message: &str) -> Self {
        self.replies
            .entry(method.to_owned())
            .or_default()
            .push_back(Scripted::Error {
                code,
                message: message.to_owned(),
            });
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            replies: Mutex::new(self.replies),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl JsonRpcTransport for MockTransport {
    async fn call(
        &self,
        method: &str,
        endpoint: Option<&str>,
        params: Vec<serde_json::Value>,
        http_method: HttpMethod,
    ) -> Result<DaemonResponse, CoreError> {
        self.calls
            .lock()
            .expect("mock call log poisoned")
            .push(RecordedCall {
                method: method.to_owned(),
                endpoint: endpoint.map(str::to_owned),
                params,
                http_method,
            });

        let scripted = {
            let mut replies = self.replies.lock().expect("mock replies poisoned");
            match replies.get_mut(method) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match scripted {
            Some(Scripted::Result { status, value }) => Ok(DaemonResponse {
                http_status: status,
                id: format!("{method}-mock"),
                result: value,
                headers: HashMap::new(),
            }),
            Some(Scripted::Error { code, message }) => Err(DaemonError::Response(
                DaemonResponseError {
                    code,
                    message,
                    data: None,
                },
            )
            .into()),
            None => Err(DaemonError::Response(DaemonResponseError {
                code: -32601,
                message: "Method not found".to_owned(),
                data: None,
            })
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_replies_are_consumed_then_last_sticks() {
        let rpc = MockTransport::builder()
            .reply("getblockcount", serde_json::json!(1))
            .reply("getblockcount", serde_json::json!(2))
            .build();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let res = rpc.post("getblockcount", None, Vec::new()).await.unwrap();
            seen.push(res.result);
        }
        assert_eq!(
            seen,
            vec![
                serde_json::json!(1),
                serde_json::json!(2),
                serde_json::json!(2)
            ]
        );
        assert_eq!(rpc.call_count("getblockcount"), 3);
    }

    #[tokio::test]
    async fn unscripted_method_fails_like_daemon() {
        let rpc = MockTransport::builder().build();
        let err = rpc.post("nosuchmethod", None, Vec::new()).await.unwrap_err();
        assert_eq!(err.daemon_code(), Some(-32601));
    }

    #[tokio::test]
    async fn records_endpoint_and_params() {
        let rpc = MockTransport::builder()
            .reply_error("getbalance", -18, "Requested wallet does not exist")
            .build();
        let _ = rpc
            .post("getbalance", Some("wallet/cold"), vec![serde_json::json!("*")])
            .await;
        let call = rpc.last_call("getbalance").expect("call recorded");
        assert_eq!(call.endpoint.as_deref(), Some("wallet/cold"));
        assert_eq!(call.params, vec![serde_json::json!("*")]);
        assert_eq!(call.http_method, HttpMethod::Post);
    }
}
