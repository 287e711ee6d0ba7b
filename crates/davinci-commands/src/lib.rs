//! # Da Vinci Commands
//!
//! The bot's command set. [`install`] registers every command, subcommand
//! and button binding into a [`RuntimeContextBuilder`]; the services the
//! handlers need are registered by the caller:
//!
//! - `dyn BookmarkStore` for the bookmark commands
//! - `ImagePipeline` for the image commands and buttons
//!
//! | text command      | aliases                       |
//! |-------------------|-------------------------------|
//! | `help`            |                               |
//! | `ping`            |                               |
//! | `pin`, `unpin`    |                               |
//! | `bookmark-create` | `bookmark-add`, `bc`, `bmcr`  |
//! | `bookmark-list`   | `bookmark-ls`, `bls`          |
//! | `bookmark-search` | `bookmark-query`, `bq`        |
//! | `bookmark-delete` | `bookmark-del`, `bd`, `bmdel` |
//! | `rotate`          | `rt`                          |
//! | `blackwhite`      | `bw`                          |

pub mod bookmark;
pub mod help;
pub mod images;
pub mod pin;
pub mod ping;

mod reply;

#[cfg(test)]
mod test_support;

use davinci_framework::{RegistryResult, RuntimeContextBuilder};

/// Registers the full command set.
pub fn install(builder: &mut RuntimeContextBuilder) -> RegistryResult<()> {
    builder
        .text_command(help::command())?
        .text_command(ping::command())?
        .text_command(pin::pin_command())?
        .text_command(pin::unpin_command())?
        .text_command(bookmark::create_command())?
        .text_command(bookmark::list_command())?
        .text_command(bookmark::search_command())?
        .text_command(bookmark::delete_command())?
        .text_command(images::rotate_command())?
        .text_command(images::blackwhite_command())?;

    for definition in images::context_menu_commands() {
        builder.command(definition)?;
    }
    bookmark::install_application(builder)?;

    for binding in images::button_bindings() {
        builder.button(binding);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use davinci_framework::testing::RecordingGateway;
    use davinci_framework::{RegistryError, RuntimeContext};

    use super::*;

    #[test]
    fn test_install_registers_everything() {
        let mut builder = RuntimeContext::builder(RecordingGateway::new());
        install(&mut builder).unwrap();
        let runtime = builder.build();

        assert_eq!(runtime.text_commands().len(), 10);
        let app: Vec<_> = runtime.commands().iter().map(|d| d.name().to_string()).collect();
        assert_eq!(
            app,
            [
                "Rotate 90deg",
                "Rotate -90deg",
                "Rotate 180deg",
                "Rotate 270deg",
                "Black & White",
                "bookmark"
            ]
        );
        assert_eq!(runtime.subcommands().len(), 3);
        assert_eq!(runtime.buttons().len(), 3);
        assert!(runtime.text_commands().resolve_ignore_case("RT").is_ok());
    }

    #[test]
    fn test_install_twice_collides() {
        let mut builder = RuntimeContext::builder(RecordingGateway::new());
        install(&mut builder).unwrap();
        let err = install(&mut builder).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName { name, .. } if name == "help"));
    }
}
