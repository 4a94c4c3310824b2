// Composition root for the notifier.
//
// Responsibilities
// - Read settings and the service-account bundle from the environment.
// - Instantiate the Firestore, FCM and file adapters and wire them into the poller.
// - The binary entry point lives in main.rs next to this module.

pub mod context;
pub mod settings;
