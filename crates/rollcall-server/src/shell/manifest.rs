//! The application-shell cache contract.
//!
//! Bumping [`CACHE_TAG`] is the whole upgrade protocol: the next successful
//! install writes a fresh generation directory under the new tag, and the
//! activation sweep that follows removes every other generation.

/// Identity of the current cache generation.
pub const CACHE_TAG: &str = "attendance-tracker-cache-v2";

/// The document served when a navigation cannot reach the upstream.
pub const SHELL_FALLBACK: &str = "/index.html";

/// The document served when an uncached asset cannot be fetched. Matches the
/// root entry of the manifest, so it is always present after an install.
pub const LAST_RESORT_FALLBACK: &str = "/";

/// Every URL fetched eagerly at install, in fetch order.
///
/// Relative entries resolve against the configured upstream origin; absolute
/// entries are fetched verbatim. The list is deliberately explicit rather
/// than discovered — an asset missing here is an asset that will not work
/// offline.
pub const SHELL_MANIFEST: &[&str] = &[
  "/",
  "/index.html",
  "/manifest.json",
  // Scripts
  "/index.tsx",
  "/App.tsx",
  "/types.ts",
  "/hooks/useLocalStorage.ts",
  "/components/AddSubject.tsx",
  "/components/BottomNav.tsx",
  "/components/CalendarView.tsx",
  "/components/Dashboard.tsx",
  "/components/icons/AddIcon.tsx",
  "/components/icons/CalendarIcon.tsx",
  "/components/icons/CheckIcon.tsx",
  "/components/icons/CrossIcon.tsx",
  "/components/icons/DashboardIcon.tsx",
  "/components/icons/DeleteIcon.tsx",
  "/components/icons/EditIcon.tsx",
  // Icons and assets
  "/vite.svg",
  "/icons/icon-192x192.png",
  "/icons/icon-512x512.png",
  // External resources
  "https://cdn.tailwindcss.com",
  "https://aistudiocdn.com/react@^19.2.0",
  "https://aistudiocdn.com/react-dom@^19.2.0/",
];
