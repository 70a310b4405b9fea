use crate::client::{Session, Verb};
use crate::error::ApiError;
use crate::fanout::{failure_messages, Settled};
use payto_core::models::{Connection, ConnectionRequest};
use uuid::Uuid;

/// The three independent sources of the network page. Each one loads or
/// fails on its own.
#[derive(Debug)]
pub struct NetworkOverview {
    pub connections: Settled<Vec<Connection>>,
    pub incoming: Settled<Vec<Connection>>,
    pub outgoing: Settled<Vec<Connection>>,
}

impl NetworkOverview {
    /// Localized errors of the sources that failed.
    pub fn failures(&self) -> Vec<String> {
        failure_messages([
            ("Conexiones", self.connections.as_ref().err()),
            ("Solicitudes recibidas", self.incoming.as_ref().err()),
            ("Solicitudes enviadas", self.outgoing.as_ref().err()),
        ])
    }
}

pub struct NetworkApi<'a> {
    session: &'a Session,
    company_id: Uuid,
}

impl<'a> NetworkApi<'a> {
    pub(crate) fn new(session: &'a Session, company_id: Uuid) -> Self {
        Self {
            session,
            company_id,
        }
    }

    fn base(&self) -> String {
        format!("/companies/{}/network", self.company_id)
    }

    pub async fn connections(&self) -> Result<Vec<Connection>, ApiError> {
        self.session
            .call(
                Verb::Get,
                "GET /companies/:id/network/connections",
                format!("{}/connections", self.base()),
            )
            .send()
            .await
    }

    pub async fn incoming_requests(&self) -> Result<Vec<Connection>, ApiError> {
        self.session
            .call(
                Verb::Get,
                "GET /companies/:id/network/requests/incoming",
                format!("{}/requests/incoming", self.base()),
            )
            .send()
            .await
    }

    pub async fn outgoing_requests(&self) -> Result<Vec<Connection>, ApiError> {
        self.session
            .call(
                Verb::Get,
                "GET /companies/:id/network/requests/outgoing",
                format!("{}/requests/outgoing", self.base()),
            )
            .send()
            .await
    }

    /// Load all three lists concurrently without letting one failure hide
    /// the others.
    pub async fn overview(&self) -> NetworkOverview {
        let (connections, incoming, outgoing) = tokio::join!(
            self.connections(),
            self.incoming_requests(),
            self.outgoing_requests()
        );
        NetworkOverview {
            connections,
            incoming,
            outgoing,
        }
    }

    pub async fn request(&self, request: &ConnectionRequest) -> Result<Connection, ApiError> {
        self.session
            .call(
                Verb::Post,
                "POST /companies/:id/network/requests",
                format!("{}/requests", self.base()),
            )
            .body(request)?
            .send()
            .await
    }

    pub async fn accept(&self, request_id: Uuid) -> Result<Connection, ApiError> {
        self.session
            .call(
                Verb::Post,
                "POST /companies/:id/network/requests/:id/accept",
                format!("{}/requests/{request_id}/accept", self.base()),
            )
            .send()
            .await
    }

    pub async fn reject(&self, request_id: Uuid) -> Result<Connection, ApiError> {
        self.session
            .call(
                Verb::Post,
                "POST /companies/:id/network/requests/:id/reject",
                format!("{}/requests/{request_id}/reject", self.base()),
            )
            .send()
            .await
    }

    pub async fn remove(&self, connection_id: Uuid) -> Result<(), ApiError> {
        self.session
            .call(
                Verb::Delete,
                "DELETE /companies/:id/network/connections/:id",
                format!("{}/connections/{connection_id}", self.base()),
            )
            .send_empty()
            .await
    }
}
