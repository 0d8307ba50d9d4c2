//! Client modules for external API interactions

pub(crate) mod http;
pub mod oauth1;
pub mod openai;
pub mod s3;
pub mod timedtext;
pub mod x;
pub mod youtube;

pub use oauth1::OAuth1Credentials;
pub use openai::OpenAiGenerator;
pub use s3::S3ConfigSource;
pub use timedtext::TimedTextClient;
pub use x::XClient;
pub use youtube::YouTubeClient;
