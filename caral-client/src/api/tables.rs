//! Dining tables (mesas)

use super::ApiGateway;
use crate::envelope::{self, Shape};
use crate::http::{ApiRequest, HttpClient, MultipartForm};
use crate::ClientResult;
use reqwest::Method;
use shared::models::{DiningTable, DiningTableForm, DiningTableQuery};

/// Multipart part name for the table photo
const IMAGE_FIELD: &str = "imagen";

const TABLE_SHAPES: [Shape; 3] = [Shape::SuccessData, Shape::Field("mesa"), Shape::Bare];

fn multipart(form: &DiningTableForm) -> MultipartForm {
    MultipartForm {
        fields: form.fields(),
        file: form.image.clone().map(|image| (IMAGE_FIELD, image)),
    }
}

impl<C: HttpClient> ApiGateway<C> {
    pub async fn list_tables(&self, query: &DiningTableQuery) -> ClientResult<Vec<DiningTable>> {
        let body = self
            .send(ApiRequest::get("/ajustes/mesas").query(query.to_pairs()))
            .await?;
        envelope::decode(&body, &envelope::list_shapes("mesas"))
    }

    pub async fn create_table(&self, form: &DiningTableForm) -> ClientResult<DiningTable> {
        let request = ApiRequest::post("/ajustes/mesas").multipart(multipart(form));
        let body = self.send(request).await?;
        envelope::decode(&body, &TABLE_SHAPES)
    }

    /// Multipart bodies cannot ride on PUT, so updates POST with a method override.
    pub async fn update_table(&self, table_id: i64, form: &DiningTableForm) -> ClientResult<DiningTable> {
        let request = ApiRequest::post(format!("/ajustes/mesas/{table_id}"))
            .multipart(multipart(form))
            .overriding(Method::PUT);
        let body = self.send(request).await?;
        envelope::decode(&body, &TABLE_SHAPES)
    }

    pub async fn delete_table(&self, table_id: i64) -> ClientResult<()> {
        self.send(ApiRequest::delete(format!("/ajustes/mesas/{table_id}")))
            .await?;
        Ok(())
    }
}
