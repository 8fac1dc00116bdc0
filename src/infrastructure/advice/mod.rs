mod http_client;
mod mock_client;

pub use http_client::HttpAdviceClient;
pub use mock_client::MockAdviceClient;
