use serde::Deserialize;
use serde::Serialize;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub next: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: ResponseMetadata,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        ListResponse {
            data,
            meta: ResponseMetadata { next: None },
        }
    }
}

impl<A, B> From<metadata::metadata::ListResponse<B>> for ListResponse<A>
where B: Into<A>
{
    fn from(value: metadata::metadata::ListResponse<B>) -> Self {
        ListResponse {
            data: value.data.into_iter().map(|v| v.into()).collect(),
            meta: ResponseMetadata {
                next: value.meta.next,
            },
        }
    }
}
