//! Dialog text lookup.
//!
//! Localization lives outside this crate; [`TextProvider`] is the seam it plugs
//! into. [`EnglishTexts`] is the built-in table.

/// Keys for every title, message and label shown by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum MessageKey {
    DeleteFileTitle,
    DeleteFolderTitle,
    DeleteItemsTitle,
    ConfirmFileDelete,
    ConfirmFolderDelete,
    ConfirmItemsDelete,

    CopyFileTitle,
    CopyFileMessage,
    CopyFolderTitle,
    CopyFolderMessage,
    CopyItemsTitle,
    CopyItemsMessage,
    CopyActionLabel,
    CannotCopyItem,
    CannotCopyAllItems,

    MoveFileTitle,
    MoveFileMessage,
    MoveFolderTitle,
    MoveFolderMessage,
    MoveItemsTitle,
    MoveItemsMessage,
    MoveActionLabel,
    CannotMoveItem,
    CannotMoveAllItems,

    CopyHereTitle,
    CopyHereMessage,
    RenameTitle,
    RenameMessage,
    InvalidNameTitle,

    PublicLinkTitle,
    PublicLinkMessage,

    UnsupportedActionTitle,
    UnsupportedActionMessage,
}

/// Source of user-facing text. Arguments replace `{0}`, `{1}`, ... placeholders.
pub trait TextProvider: Send + Sync {
    fn text(&self, key: MessageKey, args: &[&str]) -> String;
}

/// Built-in English text table.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishTexts;

impl EnglishTexts {
    fn template(key: MessageKey) -> &'static str {
        use MessageKey::*;
        match key {
            DeleteFileTitle => "Delete File",
            DeleteFolderTitle => "Delete Folder",
            DeleteItemsTitle => "Delete Items",
            ConfirmFileDelete => "Are you sure you want to delete file \"{0}\"?",
            ConfirmFolderDelete => "Are you sure you want to delete folder \"{0}\" and all its contents?",
            ConfirmItemsDelete => "Are you sure you want to delete {0} items?",

            CopyFileTitle => "Copy File",
            CopyFileMessage => "Select the folder where to copy file \"{0}\":",
            CopyFolderTitle => "Copy Folder",
            CopyFolderMessage => "Select the folder where to copy folder \"{0}\":",
            CopyItemsTitle => "Copy Items",
            CopyItemsMessage => "Select the folder where to copy {0} items:",
            CopyActionLabel => "Copy",
            CannotCopyItem => "\"{0}\" cannot be copied to the selected folder.",
            CannotCopyAllItems => "Not all of the items can be copied to the selected folder.",

            MoveFileTitle => "Move File",
            MoveFileMessage => "Select the folder where to move file \"{0}\":",
            MoveFolderTitle => "Move Folder",
            MoveFolderMessage => "Select the folder where to move folder \"{0}\":",
            MoveItemsTitle => "Move Items",
            MoveItemsMessage => "Select the folder where to move {0} items:",
            MoveActionLabel => "Move",
            CannotMoveItem => "\"{0}\" cannot be moved to the selected folder.",
            CannotMoveAllItems => "Not all of the items can be moved to the selected folder.",

            CopyHereTitle => "Copy",
            CopyHereMessage => "Enter a name for the copy of \"{0}\":",
            RenameTitle => "Rename",
            RenameMessage => "Enter a new name for \"{0}\":",
            InvalidNameTitle => "Invalid Name",

            PublicLinkTitle => "Public Link",
            PublicLinkMessage => "Public link to file \"{0}\":",

            UnsupportedActionTitle => "ERROR",
            UnsupportedActionMessage => "Unsupported action: {0}",
        }
    }
}

impl TextProvider for EnglishTexts {
    fn text(&self, key: MessageKey, args: &[&str]) -> String {
        format_template(Self::template(key), args)
    }
}

/// Substitute positional `{n}` placeholders in a template.
///
/// Arguments are inserted verbatim; placeholders inside an argument are not
/// expanded again. Placeholders without a matching argument stay as written.
pub fn format_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let arg = tail.find('}').and_then(|close| {
            let index = tail[1..close].parse::<usize>().ok()?;
            args.get(index).map(|arg| (*arg, close))
        });
        match arg {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_format_template() {
        assert_eq!(format_template("{0} of {1}", &["3", "5"]), "3 of 5");
        assert_eq!(format_template("no args", &["x"]), "no args");
    }

    #[test]
    fn test_format_template_does_not_expand_arguments() {
        assert_eq!(
            format_template("\"{0}\" and {1}", &["{1}", "b"]),
            "\"{1}\" and b"
        );
        assert_eq!(format_template("{0}{0}", &["{0}"]), "{0}{0}");
    }

    #[test]
    fn test_format_template_keeps_unmatched_braces() {
        assert_eq!(format_template("{2} {x} {", &["a"]), "{2} {x} {");
        assert_eq!(format_template("{}{0}", &["a"]), "{}a");
    }

    #[test]
    fn test_count_message() {
        let text = EnglishTexts.text(MessageKey::ConfirmItemsDelete, &["3"]);
        assert!(text.contains('3'));
    }

    #[test]
    fn test_every_key_has_text() {
        for key in MessageKey::iter() {
            assert!(!EnglishTexts.text(key, &["x"]).is_empty(), "{key:?}");
        }
    }
}
