pub mod shared {
    pub mod infrastructure {
        pub mod google_auth;
    }
}

pub mod modules {
    pub mod notifications {
        pub mod core {
            pub mod collection;
            pub mod document;
            pub mod notification;
            pub mod ports;
            pub mod watermark;
        }
        pub mod use_cases {
            pub mod poll_new_documents {
                pub mod decide;
                pub mod handler;
                pub mod report;
            }
            pub mod run_poller {
                pub mod runner;
            }
        }
        pub mod adapters {
            pub mod outbound {
                pub mod fcm_notification_dispatcher;
                pub mod file_watermark_repository;
                pub mod firestore_document_store;
            }
            pub mod in_memory {
                pub mod in_memory_document_store;
                pub mod in_memory_notification_dispatcher;
                pub mod in_memory_watermark_repository;
            }
        }
    }
}

pub mod shell;

#[cfg(test)]
pub mod tests {
    pub mod fixtures {
        pub mod documents;
    }
}
