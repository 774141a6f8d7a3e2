//! Package variants and artifact paths.
//!
//! The generated package ships three dialects of the same declarations:
//!
//! ```text
//! cleangram/
//! ├── _version.py
//! ├── core/            base variant: shapes and abstract operations
//! │   ├── base.py
//! │   ├── object/
//! │   └── path/
//! ├── sync/            blocking calls, subclasses of core
//! └── aio/             suspending calls, subclasses of core
//! ```

use std::path::PathBuf;

use cleangram_schema::{Category, Component};
use strum::{Display, EnumIter, EnumString};

/// One calling-convention dialect of the generated package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PackageVariant {
    /// Declarations only; every operation is abstract.
    Core,
    /// Operations are invoked with a blocking call.
    Sync,
    /// Operations are awaited.
    Aio,
}

impl PackageVariant {
    /// True for the variants that bind a calling convention.
    pub fn is_concrete(self) -> bool {
        self != Self::Core
    }

    /// Package directory of the variant.
    pub fn dir(self) -> PathBuf {
        PathBuf::from(self.to_string())
    }

    /// Package directory of one category inside the variant.
    pub fn category_dir(self, category: Category) -> PathBuf {
        self.dir().join(category.to_string())
    }

    /// Path of a component's module, relative to the output root.
    pub fn module_path(self, component: &Component) -> PathBuf {
        self.category_dir(component.category())
            .join(format!("{}.py", component.module_name()))
    }

    /// `def` keyword prefix of an operation's call method.
    pub fn call_prefix(self) -> &'static str {
        match self {
            Self::Aio => "async def",
            Self::Core | Self::Sync => "def",
        }
    }

    /// Expression that dispatches an operation through the bot client.
    pub fn call_expression(self) -> &'static str {
        match self {
            Self::Aio => "await bot(self)",
            Self::Core | Self::Sync => "bot(self)",
        }
    }
}

/// Path of the version artifact.
pub fn version_path() -> PathBuf {
    PathBuf::from("_version.py")
}

/// Path of the sentinel declarations.
pub fn base_path() -> PathBuf {
    PackageVariant::Core.dir().join("base.py")
}
