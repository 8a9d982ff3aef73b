//! Customer directory for the staff client picker

use super::ApiGateway;
use crate::envelope;
use crate::http::{ApiRequest, HttpClient};
use crate::ClientResult;
use shared::models::Customer;

impl<C: HttpClient> ApiGateway<C> {
    pub async fn list_customers(&self) -> ClientResult<Vec<Customer>> {
        let body = self.send(ApiRequest::get("/usuarios-clientes")).await?;
        envelope::decode(&body, &envelope::list_shapes("clientes"))
    }
}
