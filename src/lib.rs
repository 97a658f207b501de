pub mod shared {
    pub mod infrastructure {
        pub mod configuration;
        pub mod query_log;
        pub mod transport;
    }
}

pub mod processing {
    pub mod core {
        pub mod errors;
        pub mod query;
    }
    pub mod policies {
        pub mod circuit_breaker;
        pub mod predicate;
        pub mod registry;
        pub mod retry;
    }
    pub mod remote {
        pub mod proxy;
        pub mod serializer;
    }
    pub mod decorators;
    pub mod processor;
    pub mod registry;
}

pub mod modules {
    pub mod people {
        pub mod core {
            pub mod person;
            pub mod ports;
        }
        pub mod use_cases {
            pub mod get_people {
                pub mod handler;
                pub mod query;
                pub mod inbound {
                    pub mod graphql;
                    pub mod http;
                }
            }
            pub mod get_person_name {
                pub mod handler;
                pub mod query;
                pub mod inbound {
                    pub mod graphql;
                    pub mod http;
                }
            }
        }
        pub mod adapters {
            pub mod outbound {
                pub mod people_in_memory;
            }
        }
        pub mod module;
    }
    pub mod greetings {
        pub mod use_cases {
            pub mod get_random_quote {
                pub mod query;
                pub mod inbound {
                    pub mod graphql;
                    pub mod http;
                }
            }
            pub mod get_greeting {
                pub mod query;
                pub mod inbound {
                    pub mod graphql;
                    pub mod http;
                }
            }
        }
        pub mod remote;
    }
}

pub mod shell;
