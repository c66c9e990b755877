use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{ApiError, AttendanceApi, LoggedInUser, StudentRecord, Token, TokenIssuer};
use crate::interface_adapters::protocol::{
    AttendanceRecordDto, BatchRequest, DeleteAttendanceResponse, ErrorResponse,
    GenerateTokenResponse, LoginRequest, LoginResponse, StudentRowDto, UpdateAttendanceRequest,
};

const MISSING_TOKEN: &str = "token not found in response";

// Thin wrapper around reqwest for the attendance API.
#[derive(Clone)]
pub struct AttendanceClient {
    http: Client,
    base_url: String,
}

impl AttendanceClient {
    /// Builds a client; `timeout` of `None` leaves requests unbounded.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base_url: String = base_url.into();
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // Sends the request and keeps upstream status/message on non-2xx replies.
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let res = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = res.status();

        if !status.is_success() {
            let message = res
                .json::<ErrorResponse>()
                .await
                .ok()
                .map(|payload| payload.message);
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        Ok(res)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl TokenIssuer for AttendanceClient {
    async fn issue_token(&self, batch_name: &str) -> Result<Token, ApiError> {
        let request = self
            .http
            .put(self.url("/batch/generate"))
            .json(&BatchRequest { batch_name });
        let body: GenerateTokenResponse = self.send_json(request).await?;

        let token = body
            .updated_batch
            .and_then(|batch| batch.token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Malformed(MISSING_TOKEN.to_string()))?;
        debug!(batch = %batch_name, "token received");
        Ok(Token::new(token))
    }
}

#[async_trait]
impl AttendanceApi for AttendanceClient {
    async fn login(&self, user_id: &str, password: &str) -> Result<LoggedInUser, ApiError> {
        let request = self
            .http
            .post(self.url("/profile/login"))
            .json(&LoginRequest { user_id, password });
        let body: LoginResponse = self.send_json(request).await?;

        Ok(LoggedInUser {
            user_id: body.user.user_id,
            batch_names: body.user.batch_names,
        })
    }

    async fn attendance_records(&self, batch_name: &str) -> Result<Vec<StudentRecord>, ApiError> {
        let request = self
            .http
            .post(self.url("/profile/view"))
            .json(&BatchRequest { batch_name });
        let rows: Vec<AttendanceRecordDto> = self.send_json(request).await?;

        // Row ids are 1-based positions in the server's order.
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| row.into_record(index + 1))
            .collect())
    }

    async fn update_attendance(
        &self,
        batch_name: &str,
        changed: &[StudentRecord],
    ) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.url("/attendance/update"))
            .json(&UpdateAttendanceRequest {
                students: changed.iter().map(StudentRowDto::from).collect(),
                batch_name,
            });
        self.send(request).await?;
        Ok(())
    }

    async fn delete_attendance(&self, batch_name: &str) -> Result<String, ApiError> {
        let request = self
            .http
            .delete(self.url("/attendance/delete"))
            .json(&BatchRequest { batch_name });
        let body: DeleteAttendanceResponse = self.send_json(request).await?;
        Ok(body.msg.unwrap_or_default())
    }

    async fn departments(&self) -> Result<Vec<String>, ApiError> {
        let request = self.http.get(self.url("/departments"));
        self.send_json(request).await
    }
}
