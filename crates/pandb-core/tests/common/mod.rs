pub mod xapi_server;
