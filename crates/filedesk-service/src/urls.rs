//! `file_action` URL construction.

use url::Url;

use filedesk_core::{Action, File, FileSystemItem, ItemKind, ValidationError};

use crate::config::{ConfigError, ServiceConfig};

/// Builds action URLs below a service base URL.
///
/// Every URL has the form
/// `{base}/file_action?action=<action>&id=<id>&item_type=<f|d>[&session=<sid>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    base: Url,
    session_id: Option<String>,
}

impl UrlBuilder {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            session_id: None,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base: config.url()?,
            session_id: config.session_id.clone(),
        })
    }

    /// Set the session used when a call supplies none.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Download URL of a file.
    pub fn download(&self, file: &File, session_id: Option<&str>) -> String {
        self.action_url(Action::Download, file.id.as_str(), ItemKind::File, session_id)
    }

    /// Zip download URL of a file or folder.
    pub fn download_as_zip(&self, item: &FileSystemItem, session_id: Option<&str>) -> String {
        self.action_url(
            Action::DownloadAsZip,
            item.id().as_str(),
            item.kind(),
            session_id,
        )
    }

    /// Public link of a file.
    pub fn public_link(&self, file: &File) -> String {
        self.action_url(Action::PublicLink, file.id.as_str(), ItemKind::File, None)
    }

    /// One zip download URL for several items, one `id` pair per item.
    ///
    /// A selection may mix files and folders, so no `item_type` is sent; the
    /// service resolves each id itself.
    pub fn batch_zip(
        &self,
        items: &[FileSystemItem],
        session_id: Option<&str>,
    ) -> Result<String, ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::EmptySelection);
        }

        let mut url = self.endpoint();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("action", Action::DownloadAsZip.as_ref());
            for item in items {
                query.append_pair("id", item.id().as_str());
            }
            if let Some(session) = session_id.or(self.session_id.as_deref()) {
                query.append_pair("session", session);
            }
        }
        Ok(url.into())
    }

    fn action_url(
        &self,
        action: Action,
        id: &str,
        kind: ItemKind,
        session_id: Option<&str>,
    ) -> String {
        let mut url = self.endpoint();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("action", action.as_ref())
                .append_pair("id", id)
                .append_pair("item_type", item_type(kind));
            if let Some(session) = session_id.or(self.session_id.as_deref()) {
                query.append_pair("session", session);
            }
        }
        url.into()
    }

    fn endpoint(&self) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("file_action");
        }
        url
    }
}

fn item_type(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::File => "f",
        ItemKind::Folder => "d",
    }
}

#[cfg(test)]
mod tests {
    use filedesk_core::Folder;

    use super::*;

    fn builder() -> UrlBuilder {
        UrlBuilder::new(Url::parse("https://files.test/api/").unwrap())
    }

    fn file() -> File {
        File::new("f 1", "d1", "r1", "a.txt", "/r1/a.txt", 1)
    }

    #[test]
    fn test_download_url() {
        assert_eq!(
            builder().download(&file(), None),
            "https://files.test/api/file_action?action=download&id=f+1&item_type=f"
        );
        assert_eq!(
            builder().download(&file(), Some("s9")),
            "https://files.test/api/file_action?action=download&id=f+1&item_type=f&session=s9"
        );
    }

    #[test]
    fn test_base_without_trailing_slash() {
        let urls = UrlBuilder::new(Url::parse("https://files.test/api").unwrap());
        let folder: FileSystemItem = Folder::root("r1", "r1", "/r1").into();
        assert_eq!(
            urls.download_as_zip(&folder, None),
            "https://files.test/api/file_action?action=download_as_zip&id=r1&item_type=d"
        );
    }

    #[test]
    fn test_default_session() {
        let urls = builder().with_session("abc");
        assert!(urls.public_link(&file()).ends_with("&session=abc"));
        assert!(urls.download(&file(), Some("xyz")).ends_with("&session=xyz"));
    }

    #[test]
    fn test_batch_zip() {
        let items: Vec<FileSystemItem> =
            vec![file().into(), Folder::root("r2", "r2", "/r2").into()];
        assert_eq!(
            builder().batch_zip(&items, None).unwrap(),
            "https://files.test/api/file_action?action=download_as_zip&id=f+1&id=r2"
        );
        assert_eq!(
            builder().batch_zip(&items, Some("s9")).unwrap(),
            "https://files.test/api/file_action?action=download_as_zip&id=f+1&id=r2&session=s9"
        );
        assert_eq!(
            builder().with_session("abc").batch_zip(&items, None).unwrap(),
            "https://files.test/api/file_action?action=download_as_zip&id=f+1&id=r2&session=abc"
        );
        assert_eq!(
            builder().batch_zip(&[], None).unwrap_err(),
            ValidationError::EmptySelection
        );
    }
}
