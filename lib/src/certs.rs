//! Built-in JSON Web Key Sets.
//!
//! The claim program cannot fetch keys at proving time, so the sets it
//! trusts are compiled in. Refresh the Google snapshot with
//! `bonsai-pay certs` when Google rotates its signing keys.

/// Snapshot of <https://www.googleapis.com/oauth2/v3/certs>.
pub static GOOGLE_PUB_JWK: &str = r#"
{
  "keys": [
    {
      "alg": "RS256",
      "kty": "RSA",
      "use": "sig",
      "kid": "4529c409f77a106fb67ee1a85d168fd2cfb7c0b7",
      "e": "AQAB",
      "n": "1crrYmsX8OVzrN9BTDD4RlVJDqSQIEbRby9ELqTmCpW1Qtt7y-pdmLPqlYG1ND5mprkTA83S7g_dcsxuV4wxK4_Vv5a8IBn86HfAX4VfCCOzqBYgACN6hlaffzPIWL1QA8yZ4w-D0fnN3xC5ULhtmtBG23qi__4yEo_FIY6irvbHrpRNI_-vjxFokm2X3ENP2ZOwgNhDIthwJo8l1KNbZa1riAJVcF86zWILQTy756hh8eH1Kt05wsGB3DeGPNV55zYv6sB2bzxARsVYAtCRJ8c28FYWwU8dCRJ70eJEmY4aKFOBO5g4fwYJlvMm9Le7qgAUH5-7wO52BayqXmqAOQ"
    },
    {
      "alg": "RS256",
      "kty": "RSA",
      "use": "sig",
      "kid": "d2d444cf8c5e3ae8386d66a13a316976aa369991",
      "e": "AQAB",
      "n": "onV5tzUbqyPfkM6MwUqCtrqun9x20hEUbIUlmAYYuPuMhsaNHJqs1AVzRt2TzaNjmPVddEbU7VMDmeFWUt7vgDi7Xu0leevuIN4VSPbAMGBa0oj9Qopqkn9ePO_7DvIN13ktHgfQqatNBu6uXH6zkUl3VtXnubXrUhx7uyF22dARDc1-pJoj2NnsvgxDRElPMyDkU-siVv3c6cgIEwLEZZPWOcwplPTUB4qeTK6prrPBGQshuE1PWK2ZrYpIvXfzHyEbkGdPnrhcxgCzbKBUFvr8n_sfSurLRoDBLjkURKmgB8T8iRzLyXsCu9D3Hw61LKuex1aeSQLdwOFLuUEBdw"
    }
  ]
}
"#;

/// Key set for the test identity provider. The matching private key is
/// `fixtures/test_key.pem`; never use this provider outside development.
pub static TEST_PUB_JWK: &str = r#"
{
  "keys": [
    {
      "alg": "RS256",
      "kty": "RSA",
      "use": "sig",
      "kid": "bonsai-pay-test-1",
      "e": "AQAB",
      "n": "2x95Xxseg-dUSjBVxdWCAJ3wWBffFSb0BnMlSlP12rDWbKr5RCrXdtwVhV70W4Wir4rBkDC6JTcwHHzxQi5jS-Qg2CNTKXCMoABpHbWqFRimMbgorH7-3bAo0_tFO7HlbQM8QoDRySJ3QWQbOiFCDqiWnE1p9TifzGVY-HZDNlUsfna5-uUqCvvrR6ZFrY8LXvzhF3Eyq3eXpb6bbK3Yo1Tb5mvuZ8RPW3-NeQtEgNs1viybFLqxkzyfRtDdjs9NqHaXjnEC61exRjpDRVStc3aDXEav57pug2nqkaEzu4b9yYVxWv6hzY_hqMPcNJc_eDoXJjgqLcZRjApIShfLhw"
    }
  ]
}
"#;

/// Key ID of the single key in [`TEST_PUB_JWK`].
pub const TEST_KID: &str = "bonsai-pay-test-1";

